//! The error type shared by every stage of the pipeline.

use failure::Fail;
use std::path::Path;

/// Everything that can go wrong while planning, rendering, or
/// assembling a zoom.
#[derive(Debug, Fail)]
pub enum ZoomError {
    /// A parameter of the movie or gradient makes no sense.  Caught at
    /// construction, before any work is scheduled.
    #[fail(display = "Invalid configuration: {}", _0)]
    Config(String),

    /// Reading or writing a file failed.
    #[fail(display = "I/O failure on {}: {}", path, cause)]
    Io {
        /// The file or directory involved.
        path: String,
        /// What the OS said.
        #[cause]
        cause: std::io::Error,
    },

    /// A frame on disk could not be decoded.
    #[fail(display = "Could not decode frame {}: {}", path, cause)]
    Image {
        /// The frame file.
        path: String,
        /// What the decoder said.
        #[cause]
        cause: image::ImageError,
    },

    /// A frame on disk does not have the dimensions of the movie.
    #[fail(
        display = "Frame {} is {}x{}, expected {}x{}",
        index, width, height, expected_width, expected_height
    )]
    FrameSize {
        /// 1-based frame index.
        index: usize,
        /// Width found on disk.
        width: u32,
        /// Height found on disk.
        height: u32,
        /// Width of the movie.
        expected_width: u32,
        /// Height of the movie.
        expected_height: u32,
    },

    /// The worker rendering a frame panicked.
    #[fail(display = "Worker rendering frame {} panicked", _0)]
    WorkerPanicked(usize),

    /// The video encoder could not be started or did not finish cleanly.
    #[fail(display = "Video encoder failure: {}", _0)]
    Encoder(String),
}

impl ZoomError {
    pub(crate) fn io(path: &Path, cause: std::io::Error) -> Self {
        ZoomError::Io {
            path: path.display().to_string(),
            cause,
        }
    }

    pub(crate) fn image(path: &Path, cause: image::ImageError) -> Self {
        ZoomError::Image {
            path: path.display().to_string(),
            cause,
        }
    }
}
