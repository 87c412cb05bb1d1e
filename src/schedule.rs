//! The geometric zoom: a starting scale, a target scale, and a ratio
//! applied once per frame.

use crate::complex::{ComplexValue, Real};
use crate::errors::ZoomError;
use crate::planes::ViewportFrame;

/// The MovieSpec contains the parameters by which a zoom is generated.
/// Once set, this object should not be mutable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MovieSpec<T: Real> {
    center: ComplexValue<T>,
    unit_before: T,
    unit_after: T,
    change_ratio: T,
    width: u16,
    height: u16,
    iterations: u32,
    frame_count: usize,
}

impl<T: Real> MovieSpec<T> {
    /// Validates the parameters and counts the frames they imply.  The
    /// ratio must be strictly between 0 and 1, or the zoom never reaches
    /// its target.
    pub fn new(
        center: ComplexValue<T>,
        unit_before: T,
        unit_after: T,
        change_ratio: T,
        width: u16,
        height: u16,
        iterations: u32,
    ) -> Result<Self, ZoomError> {
        if !(center.re.is_finite() && center.im.is_finite()) {
            return Err(ZoomError::Config(format!(
                "Center {} is not a finite coordinate",
                center
            )));
        }
        if !(change_ratio > T::zero() && change_ratio < T::one()) {
            return Err(ZoomError::Config(format!(
                "Scale ratio must lie strictly between 0 and 1, got {}",
                change_ratio
            )));
        }
        for &(name, unit) in &[("Starting", unit_before), ("Ending", unit_after)] {
            if !(unit.is_finite() && unit > T::zero()) {
                return Err(ZoomError::Config(format!(
                    "{} scale must be a positive number, got {}",
                    name, unit
                )));
            }
        }
        if unit_before < unit_after {
            return Err(ZoomError::Config(format!(
                "Starting scale {} is already smaller than ending scale {}",
                unit_before, unit_after
            )));
        }
        if width == 0 || height == 0 {
            return Err(ZoomError::Config(format!(
                "Frame size {}x{} has no pixels",
                width, height
            )));
        }
        if iterations == 0 {
            return Err(ZoomError::Config(
                "Iteration count must be at least 1".to_string(),
            ));
        }

        let mut spec = MovieSpec {
            center,
            unit_before,
            unit_after,
            change_ratio,
            width,
            height,
            iterations,
            frame_count: 0,
        };
        spec.frame_count = spec.schedule().count();
        Ok(spec)
    }

    /// The number of frames in the movie: the smallest `n` for which
    /// `unit_before * change_ratio^n` drops below `unit_after`.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Every frame of the movie, in order, with its scale.
    pub fn schedule(&self) -> ZoomSchedule<T> {
        ZoomSchedule {
            index: 1,
            unit: self.unit_before,
            unit_after: self.unit_after,
            change_ratio: self.change_ratio,
        }
    }

    /// The viewport for the frame rendered at `unit`.
    pub fn viewport(&self, unit: T) -> ViewportFrame<T> {
        ViewportFrame::centered(self.width, self.height, self.center, unit, self.iterations)
    }

    /// The point the zoom converges on.
    pub fn center(&self) -> ComplexValue<T> {
        self.center
    }

    /// Scale of the first frame.
    pub fn unit_before(&self) -> T {
        self.unit_before
    }

    /// The scale below which the zoom stops.
    pub fn unit_after(&self) -> T {
        self.unit_after
    }

    /// Per-frame scale multiplier.
    pub fn change_ratio(&self) -> T {
        self.change_ratio
    }

    /// Frame width and height in pixels.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Iteration cap for every pixel of every frame.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// One frame of the schedule: its 1-based index and its scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScheduledFrame<T: Real> {
    /// 1-based frame index; also the frame's file name.
    pub index: usize,
    /// Plane units per pixel.
    pub unit: T,
}

/// Walks the zoom one frame at a time.  The scale is advanced by
/// repeated multiplication, never by exponentiation, so every run
/// visits exactly the same sequence of floating-point values.
#[derive(Clone, Debug)]
pub struct ZoomSchedule<T: Real> {
    index: usize,
    unit: T,
    unit_after: T,
    change_ratio: T,
}

impl<T: Real> Iterator for ZoomSchedule<T> {
    type Item = ScheduledFrame<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.unit < self.unit_after {
            return None;
        }
        let frame = ScheduledFrame {
            index: self.index,
            unit: self.unit,
        };
        self.index += 1;
        self.unit = self.unit * self.change_ratio;
        Some(frame)
    }
}
