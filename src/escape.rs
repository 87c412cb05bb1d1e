//! The escape-time test at the heart of every Mandelbrot renderer.

use crate::complex::{lift, ComplexValue, Real};

/// This is our classic iterator function, which either returns the
/// iteration (counting from zero) at which the orbit of `c` left the
/// circle of radius 2, or nothing at all if it stayed inside for
/// `cap` iterations and is presumed to belong to the set.
///
/// The bound is checked on every iteration, not every few: the returned
/// count picks the pixel's color, so it has to be exact.
#[inline]
pub fn divergence_time<T: Real>(c: ComplexValue<T>, cap: u32) -> Option<u32> {
    let four: T = lift(4);
    let mut z = ComplexValue::new(T::zero(), T::zero());
    for i in 0..cap {
        z = z * z + c;
        if z.norm_sqr() > four {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for cap in &[0, 1, 10, 1000] {
            assert_eq!(divergence_time(ComplexValue::new(0.0_f64, 0.0), *cap), None);
        }
    }

    #[test]
    fn points_outside_radius_escape_immediately() {
        let points = [
            (2.5, 0.0),
            (-2.0, 2.0),
            (0.0, -2.01),
            (1.5, 1.5),
            (-100.0, 42.0),
        ];
        for &(re, im) in &points {
            for cap in &[1, 2, 50] {
                assert_eq!(divergence_time(ComplexValue::new(re, im), *cap), Some(0));
            }
        }
    }

    #[test]
    fn the_escape_bound_is_strict() {
        // c = 2 lands exactly on |z|^2 = 4 after one step, then 6 after two.
        assert_eq!(divergence_time(ComplexValue::new(2.0_f64, 0.0), 10), Some(1));
        // c = -2 is on the boundary of the set and bounces on 4 forever.
        assert_eq!(divergence_time(ComplexValue::new(-2.0_f64, 0.0), 100), None);
    }

    #[test]
    fn cap_limits_the_search() {
        // 1 - i: z1 = 1 - i (|z|^2 = 2), z2 = 1 - 3i (|z|^2 = 10)
        let c = ComplexValue::new(1.0_f64, -1.0);
        assert_eq!(divergence_time(c, 1), None);
        assert_eq!(divergence_time(c, 2), Some(1));
    }

    #[test]
    fn main_cardioid_is_inside() {
        assert_eq!(divergence_time(ComplexValue::new(-0.5_f64, 0.0), 5000), None);
        assert_eq!(divergence_time(ComplexValue::new(0.25_f32, 0.0), 200), None);
    }

    #[test]
    fn zero_cap_never_escapes() {
        assert_eq!(divergence_time(ComplexValue::new(10.0_f64, 10.0), 0), None);
    }
}
