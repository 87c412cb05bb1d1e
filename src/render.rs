//! The FrameRenderer: turns a viewport into pixels, and pixels into
//! frame files.

use crate::complex::Real;
use crate::errors::ZoomError;
use crate::escape::divergence_time;
use crate::gradient::{GradientTable, INSIDE};
use crate::planes::{Pixel, ViewportFrame};
use image::png::PNGEncoder;
use image::{ColorType, ImageFormat, RgbImage};
use itertools::iproduct;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Color every pixel of the viewport.  Pixels that escape take their
/// color from the gradient, indexed by escape time; pixels that never
/// escape are painted `INSIDE`.  No pixel depends on any other.
pub fn render_frame<T: Real>(viewport: &ViewportFrame<T>, gradient: &GradientTable) -> RgbImage {
    let mut image = RgbImage::new(u32::from(viewport.width), u32::from(viewport.height));
    for (row, column) in iproduct!(0..viewport.height, 0..viewport.width) {
        let point = viewport.pixel_to_point(Pixel(column, row));
        let color = match divergence_time(point, viewport.iterations) {
            Some(time) => gradient.color_for(time),
            None => INSIDE,
        };
        image.put_pixel(u32::from(column), u32::from(row), color);
    }
    image
}

/// Encode the image as a PNG and write it to `path`.  Encoding is
/// deterministic: the same image always produces the same bytes.
pub fn write_frame(image: &RgbImage, path: &Path) -> Result<(), ZoomError> {
    let file = File::create(path).map_err(|e| ZoomError::io(path, e))?;
    let mut output = BufWriter::new(file);
    PNGEncoder::new(&mut output)
        .encode(image, image.width(), image.height(), ColorType::RGB(8))
        .map_err(|e| ZoomError::io(path, e))?;
    output.flush().map_err(|e| ZoomError::io(path, e))?;
    Ok(())
}

/// Read a frame file back as RGB.  Frames are always PNG, so the
/// decoder is chosen here and not from the file name.
pub fn read_frame(path: &Path) -> Result<RgbImage, ZoomError> {
    let file = File::open(path).map_err(|e| ZoomError::io(path, e))?;
    image::load(BufReader::new(file), ImageFormat::PNG)
        .map(|frame| frame.to_rgb())
        .map_err(|e| ZoomError::image(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ComplexValue;
    use image::Rgb;

    fn four_by_four() -> ViewportFrame<f64> {
        ViewportFrame::centered(4, 4, ComplexValue::new(0.0, 0.0), 1.0, 10)
    }

    #[test]
    fn corners_and_center_of_a_small_frame() {
        let gradient = GradientTable::build(90.0, 100.0, 100.0).unwrap();
        let image = render_frame(&four_by_four(), &gradient);
        let escaped_at_once = gradient.color_for(0);
        assert_eq!(*image.get_pixel(0, 0), escaped_at_once);
        assert_eq!(*image.get_pixel(3, 0), escaped_at_once);
        assert_eq!(*image.get_pixel(0, 3), escaped_at_once);
        // 1 - i has modulus sqrt(2); it takes one more step to escape.
        assert_eq!(*image.get_pixel(3, 3), gradient.color_for(1));
        assert_eq!(*image.get_pixel(2, 2), INSIDE);
    }

    #[test]
    fn rendering_is_deterministic() {
        let gradient = GradientTable::build(3.0, 50.0, 70.0).unwrap();
        let viewport = ViewportFrame::centered(32, 24, ComplexValue::new(-0.75, 0.1), 0.02, 200);
        let a = render_frame(&viewport, &gradient);
        let b = render_frame(&viewport, &gradient);
        assert_eq!(a.into_raw(), b.into_raw());
    }

    #[test]
    fn frames_survive_a_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.png");
        let gradient = GradientTable::build(10.0, 60.0, 90.0).unwrap();
        let image = render_frame(&four_by_four(), &gradient);
        write_frame(&image, &path).unwrap();
        let back = read_frame(&path).unwrap();
        assert_eq!(back.dimensions(), (4, 4));
        assert_eq!(back.into_raw(), image.into_raw());
    }

    #[test]
    fn frame_files_are_png_whatever_their_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.bmp");
        let gradient = GradientTable::build(10.0, 60.0, 90.0).unwrap();
        let image = render_frame(&four_by_four(), &gradient);
        write_frame(&image, &path).unwrap();
        let back = read_frame(&path).unwrap();
        assert_eq!(back.into_raw(), image.into_raw());
    }

    #[test]
    fn inside_color_is_not_in_the_gradient() {
        let gradient = GradientTable::build(1.0, 50.0, 70.0).unwrap();
        assert!(!gradient.colors().contains(&Rgb([0, 0, 0])));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("1.png");
        let image = RgbImage::new(2, 2);
        match write_frame(&image, &path) {
            Err(ZoomError::Io { .. }) => {}
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }
}
