//! The numeric foundation.  Every stage of the zoom (the escape-time
//! iteration, the pixel mapping, and the scale schedule) is written
//! against a single real type `T`, fixed once per movie.  Deep zooms
//! run out of `f32` precision around a unit of 1e-7 per pixel and out
//! of `f64` around 1e-16; past that, neighbouring pixels collapse onto
//! the same coordinate.

use num::traits::Float;
use num::Complex;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// A point on the complex plane.  `num::Complex` already gives us
/// `+`, `-` and `*` by value, each producing a fresh number.
pub type ComplexValue<T> = Complex<T>;

/// The real number representation used for coordinates and scales.
/// Pixel indices are converted through `From<u16>`, which is why frame
/// dimensions are capped at 65535.
pub trait Real: Float + From<u16> + FromStr + Debug + Display + Send + Sync + 'static {}

impl<T> Real for T where
    T: Float + From<u16> + FromStr + Debug + Display + Send + Sync + 'static
{
}

/// Lift a small integer (a pixel index, a constant) into `T`.
#[inline]
pub fn lift<T: Real>(n: u16) -> T {
    <T as From<u16>>::from(n)
}
