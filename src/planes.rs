//! Contains the ViewportFrame struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0 in
//! the top-left corner, and a square-pixeled window onto the complex
//! plane anchored at the coordinate of that corner.
use crate::complex::{lift, ComplexValue, Real};

/// Describes the x, y of a pixel on the integral plane.  Rows grow
/// downward.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub u16, pub u16);

/// Everything needed to render one frame of the zoom.  Two frames
/// built from equal viewports are identical, pixel for pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewportFrame<T: Real> {
    /// Width of the image in pixels.
    pub width: u16,
    /// Height of the image in pixels.
    pub height: u16,
    /// The complex number under pixel (0, 0).
    pub upper_corner: ComplexValue<T>,
    /// The length, in plane units, of one side of a pixel.
    pub unit: T,
    /// How many iterations a point gets before it's presumed inside.
    pub iterations: u32,
}

impl<T: Real> ViewportFrame<T> {
    /// A viewport `width` x `height` pixels wide, each `unit` long on a
    /// side, whose top-left pixel sits on `upper_corner`.
    pub fn new(
        width: u16,
        height: u16,
        upper_corner: ComplexValue<T>,
        unit: T,
        iterations: u32,
    ) -> Self {
        ViewportFrame {
            width,
            height,
            upper_corner,
            unit,
            iterations,
        }
    }

    /// The viewport of the given size and scale whose central pixel is
    /// `center`.  With odd or even dimensions alike the center lands on
    /// pixel `(width / 2, height / 2)`.
    pub fn centered(
        width: u16,
        height: u16,
        center: ComplexValue<T>,
        unit: T,
        iterations: u32,
    ) -> Self {
        let half_width: T = lift(width / 2);
        let half_height: T = lift(height / 2);
        let upper_corner = center + ComplexValue::new(-unit * half_width, unit * half_height);
        ViewportFrame::new(width, height, upper_corner, unit, iterations)
    }

    /// The total number of pixels in the frame.
    pub fn len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Given a pixel on the integral plane, return the complex number
    /// under it.  The imaginary axis points up while rows count down,
    /// hence the sign flip.
    #[inline]
    pub fn pixel_to_point(&self, pixel: Pixel) -> ComplexValue<T> {
        let x: T = lift(pixel.0);
        let y: T = lift(pixel.1);
        self.upper_corner + ComplexValue::new(self.unit * x, -self.unit * y)
    }
}
