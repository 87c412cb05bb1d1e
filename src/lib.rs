#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot zoom renderer
//!
//! A zoom movie is a long run of Mandelbrot frames, all centered on the
//! same point, each one a fixed fraction of the scale of the one
//! before.  Every frame is an independent escape-time image: each pixel
//! maps to a point on the complex plane, the point is iterated until it
//! escapes (or doesn't), and the iteration count picks a color from a
//! cyclic gradient.
//!
//! Deep zooms take hours.  Frames are therefore written to disk as
//! they're finished, several at a time on worker threads, and a run
//! that is interrupted picks up where it left off: the files already
//! on disk are the checkpoint.  Once every frame exists they are fed,
//! in order, to a video encoder.

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;

pub mod complex;
pub mod errors;
pub mod escape;
pub mod gradient;
pub mod layout;
pub mod planes;
mod progress;
pub mod render;
pub mod schedule;
pub mod scheduler;
pub mod video;

pub use complex::{ComplexValue, Real};
pub use errors::ZoomError;
pub use escape::divergence_time;
pub use gradient::GradientTable;
pub use layout::Layout;
pub use planes::{Pixel, ViewportFrame};
pub use render::{read_frame, render_frame, write_frame};
pub use schedule::{MovieSpec, ScheduledFrame, ZoomSchedule};
pub use scheduler::{FrameScheduler, RenderReport};
pub use video::{assemble, Assembly, Codec, FfmpegEncoder, VideoEncoder, VideoWriter};
