//! Color gradients for the escape-time renderer.
//!
//! A gradient is a sweep around the hue wheel at a fixed saturation and
//! value, followed by the same sweep backwards.  Indexing it by
//! divergence time modulo its length makes the palette cycle
//! smoothly as the zoom deepens and iteration counts climb: the colors
//! walk out around the wheel and back again, so there is never a
//! visible seam where the palette wraps.

use crate::errors::ZoomError;
use image::Rgb;

/// The color of points that never escaped.  Not part of any gradient.
pub const INSIDE: Rgb<u8> = Rgb([0, 0, 0]);

/// A hue step this small would build a table of millions of entries.
const MAX_SWEEP: usize = 1 << 20;

/// Convert hue (degrees), saturation and value (both percentages) to an
/// RGB color.  The hue is truncated to whole degrees when locating its
/// position inside a sextant, and channel values are truncated, not
/// rounded, when they become bytes.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb<u8> {
    let h1 = (hue.trunc() % 60.0) / 60.0;
    let s1 = saturation / 100.0;
    let v1 = value / 100.0;
    let a = (v1 * 255.0) as u8;
    let b = (v1 * (1.0 - s1) * 255.0) as u8;
    let c = (v1 * (1.0 - s1 * h1) * 255.0) as u8;
    let d = (v1 * (1.0 - s1 * (1.0 - h1)) * 255.0) as u8;

    if saturation == 0.0 {
        Rgb([a, a, a])
    } else if hue < 60.0 {
        Rgb([a, d, b])
    } else if hue < 120.0 {
        Rgb([c, a, b])
    } else if hue < 180.0 {
        Rgb([b, a, d])
    } else if hue < 240.0 {
        Rgb([b, c, a])
    } else if hue < 300.0 {
        Rgb([d, b, a])
    } else {
        Rgb([a, b, c])
    }
}

/// The read-only lookup table every frame of a movie is colored with.
/// Once built, nothing mutates it; worker threads share it by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientTable {
    colors: Vec<Rgb<u8>>,
}

impl GradientTable {
    /// Sweep the hue from 0 (inclusive) to 360 (exclusive) in steps of
    /// `hue_step` degrees, then append the reverse of that sweep.  Both
    /// the turnaround color and the starting color appear twice, so the
    /// table has `2 * ceil(360 / hue_step)` entries and reads the same
    /// in both directions.
    pub fn build(hue_step: f64, saturation: f64, value: f64) -> Result<Self, ZoomError> {
        if !(hue_step.is_finite() && hue_step > 0.0) {
            return Err(ZoomError::Config(format!(
                "Gradient hue step must be a positive number, got {}",
                hue_step
            )));
        }
        if 360.0 / hue_step > MAX_SWEEP as f64 {
            return Err(ZoomError::Config(format!(
                "Gradient hue step {} is too small",
                hue_step
            )));
        }
        for &(name, v) in &[("saturation", saturation), ("value", value)] {
            if !(0.0..=100.0).contains(&v) {
                return Err(ZoomError::Config(format!(
                    "Gradient {} must be between 0 and 100, got {}",
                    name, v
                )));
            }
        }

        let sweep: Vec<Rgb<u8>> = (0u32..)
            .map(|i| i as f64 * hue_step)
            .take_while(|hue| *hue < 360.0)
            .map(|hue| hsv_to_rgb(hue, saturation, value))
            .collect();

        let mut colors = Vec::with_capacity(sweep.len() * 2);
        colors.extend_from_slice(&sweep);
        colors.extend(sweep.iter().rev());
        Ok(GradientTable { colors })
    }

    /// The number of colors in the table.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// A table built through `build` is never empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color for a point that escaped after `time` iterations.
    #[inline]
    pub fn color_for(&self, time: u32) -> Rgb<u8> {
        self.colors[time as usize % self.colors.len()]
    }

    /// All colors, in lookup order.
    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 100.0, 100.0), Rgb([255, 0, 0]));
        assert_eq!(hsv_to_rgb(120.0, 100.0, 100.0), Rgb([0, 255, 0]));
        assert_eq!(hsv_to_rgb(240.0, 100.0, 100.0), Rgb([0, 0, 255]));
    }

    #[test]
    fn secondary_hues() {
        assert_eq!(hsv_to_rgb(60.0, 100.0, 100.0), Rgb([255, 255, 0]));
        assert_eq!(hsv_to_rgb(180.0, 100.0, 100.0), Rgb([0, 255, 255]));
        assert_eq!(hsv_to_rgb(300.0, 100.0, 100.0), Rgb([255, 0, 255]));
    }

    #[test]
    fn desaturated_is_gray() {
        assert_eq!(hsv_to_rgb(0.0, 0.0, 50.0), Rgb([127, 127, 127]));
        assert_eq!(hsv_to_rgb(211.0, 0.0, 100.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn hue_is_truncated_inside_a_sextant() {
        assert_eq!(hsv_to_rgb(30.9, 100.0, 100.0), hsv_to_rgb(30.0, 100.0, 100.0));
    }

    #[test]
    fn table_length_is_twice_the_sweep() {
        assert_eq!(GradientTable::build(1.0, 50.0, 70.0).unwrap().len(), 720);
        assert_eq!(GradientTable::build(7.0, 50.0, 70.0).unwrap().len(), 104);
        assert_eq!(GradientTable::build(360.0, 50.0, 70.0).unwrap().len(), 2);
        assert_eq!(GradientTable::build(500.0, 50.0, 70.0).unwrap().len(), 2);
    }

    #[test]
    fn table_is_mirrored() {
        for step in &[1.0, 2.5, 7.0, 45.0, 100.0] {
            let table = GradientTable::build(*step, 50.0, 70.0).unwrap();
            let colors = table.colors();
            let n = colors.len();
            for i in 0..n {
                assert_eq!(colors[i], colors[n - 1 - i], "step {} index {}", step, i);
            }
        }
    }

    #[test]
    fn lookup_wraps_around() {
        let table = GradientTable::build(90.0, 100.0, 100.0).unwrap();
        assert_eq!(table.len(), 8);
        assert_eq!(table.color_for(0), Rgb([255, 0, 0]));
        assert_eq!(table.color_for(8), Rgb([255, 0, 0]));
        assert_eq!(table.color_for(7), Rgb([255, 0, 0]));
        assert_eq!(table.color_for(3), table.color_for(4));
    }

    #[test]
    fn bad_parameters_are_rejected() {
        assert!(GradientTable::build(0.0, 50.0, 70.0).is_err());
        assert!(GradientTable::build(-1.0, 50.0, 70.0).is_err());
        assert!(GradientTable::build(std::f64::NAN, 50.0, 70.0).is_err());
        assert!(GradientTable::build(1e-9, 50.0, 70.0).is_err());
        assert!(GradientTable::build(1.0, 101.0, 70.0).is_err());
        assert!(GradientTable::build(1.0, 50.0, -0.5).is_err());
    }
}
