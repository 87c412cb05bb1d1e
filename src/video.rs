//! The VideoAssembler: reads the finished frames in order and hands
//! them to a video encoder.
//!
//! Encoding itself is somebody else's job.  The `VideoEncoder` trait is
//! the whole contract: open an output for a given codec, size and frame
//! rate, append frames, finish.  `FfmpegEncoder` fulfils it by piping
//! raw RGB frames into an `ffmpeg` child process.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbImage;
use tracing::{error, info};

use crate::complex::Real;
use crate::errors::ZoomError;
use crate::layout::Layout;
use crate::progress::frame_bar;
use crate::render::read_frame;
use crate::schedule::MovieSpec;

/// How often, in frames, assembly progress is logged.
const NOTIFY_EVERY: usize = 10;

/// How long a freshly started encoder has to reject its output before
/// the video counts as open.
const STARTUP_GRACE: Duration = Duration::from_millis(250);

/// The codecs a movie can be written with, named by their fourcc.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Codec {
    /// MPEG-4 Part 2.
    Mp4v,
    /// H.264.
    Avc1,
    /// Motion JPEG.
    Mjpg,
}

impl Codec {
    /// The four-character code.
    pub fn fourcc(self) -> &'static str {
        match self {
            Codec::Mp4v => "mp4v",
            Codec::Avc1 => "avc1",
            Codec::Mjpg => "mjpg",
        }
    }

    /// The ffmpeg output options selecting this codec.
    pub fn ffmpeg_args(self) -> Vec<&'static str> {
        match self {
            Codec::Mp4v => vec!["-c:v", "mpeg4", "-q:v", "2"],
            Codec::Avc1 => vec!["-c:v", "libx264", "-pix_fmt", "yuv420p"],
            Codec::Mjpg => vec!["-c:v", "mjpeg", "-q:v", "2"],
        }
    }
}

impl FromStr for Codec {
    type Err = ZoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4v" | "mpeg4" => Ok(Codec::Mp4v),
            "avc1" | "h264" => Ok(Codec::Avc1),
            "mjpg" | "mjpeg" => Ok(Codec::Mjpg),
            _ => Err(ZoomError::Config(format!("Unknown codec {:?}", s))),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.fourcc())
    }
}

/// Something that can open a video for writing.
pub trait VideoEncoder {
    /// The open video.
    type Writer: VideoWriter;

    /// Open `path` for writing frames of `size` pixels at `fps` frames
    /// per second.
    fn open(
        &self,
        path: &Path,
        codec: Codec,
        size: (u32, u32),
        fps: f64,
    ) -> Result<Self::Writer, ZoomError>;
}

/// An open video, accepting frames in presentation order.
pub trait VideoWriter {
    /// Append one frame.
    fn append(&mut self, frame: &RgbImage) -> Result<(), ZoomError>;

    /// Flush and close the video.
    fn finish(self) -> Result<(), ZoomError>;
}

/// Encodes through an external `ffmpeg` executable.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    /// Use the `ffmpeg` found on the `PATH`.
    pub fn new() -> Self {
        FfmpegEncoder::with_program("ffmpeg")
    }

    /// Use a specific ffmpeg executable.
    pub fn with_program(program: &str) -> Self {
        FfmpegEncoder {
            program: program.to_string(),
        }
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        FfmpegEncoder::new()
    }
}

impl VideoEncoder for FfmpegEncoder {
    type Writer = FfmpegWriter;

    fn open(
        &self,
        path: &Path,
        codec: Codec,
        size: (u32, u32),
        fps: f64,
    ) -> Result<FfmpegWriter, ZoomError> {
        // ffmpeg only opens its output once frames arrive, so check now
        // that the file can be created at all.
        File::create(path).map_err(|e| ZoomError::io(path, e))?;
        let abandon = |e: ZoomError| {
            let _ = fs::remove_file(path);
            e
        };

        let size_arg = format!("{}x{}", size.0, size.1);
        let fps_arg = fps.to_string();
        let mut child = Command::new(&self.program)
            .args(&["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(&["-s", size_arg.as_str(), "-r", fps_arg.as_str(), "-i", "-"])
            .args(codec.ffmpeg_args())
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| {
                abandon(ZoomError::Encoder(format!(
                    "could not start {}: {}",
                    self.program, e
                )))
            })?;

        let deadline = Instant::now() + STARTUP_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    return Err(abandon(ZoomError::Encoder(format!(
                        "{} gave up at startup with {}",
                        self.program, status
                    ))));
                }
                Ok(None) if Instant::now() >= deadline => break,
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(abandon(ZoomError::Encoder(format!(
                        "could not watch {}: {}",
                        self.program, e
                    ))));
                }
            }
        }

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ZoomError::Encoder("ffmpeg has no standard input".to_string()))?;
        Ok(FfmpegWriter {
            child: Some(child),
            stdin: Some(BufWriter::new(stdin)),
        })
    }
}

/// A running ffmpeg process reading raw frames from a pipe.
#[derive(Debug)]
pub struct FfmpegWriter {
    child: Option<Child>,
    stdin: Option<BufWriter<ChildStdin>>,
}

impl VideoWriter for FfmpegWriter {
    fn append(&mut self, frame: &RgbImage) -> Result<(), ZoomError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ZoomError::Encoder("video already finished".to_string()))?;
        stdin
            .write_all(&**frame)
            .map_err(|e| ZoomError::Encoder(format!("ffmpeg stopped accepting frames: {}", e)))
    }

    fn finish(mut self) -> Result<(), ZoomError> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.flush().map_err(|e| {
                ZoomError::Encoder(format!("ffmpeg stopped accepting frames: {}", e))
            })?;
        }
        let mut child = match self.child.take() {
            Some(child) => child,
            None => return Ok(()),
        };
        let status = child
            .wait()
            .map_err(|e| ZoomError::Encoder(format!("could not wait for ffmpeg: {}", e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(ZoomError::Encoder(format!("ffmpeg exited with {}", status)))
        }
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        // Abandoned halfway: closing the pipe lets ffmpeg exit.
        self.stdin.take();
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }
}

/// How assembly ended, short of a hard failure.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Assembly {
    /// Every frame was written; carries the frame count.
    Completed(usize),
    /// The encoder could not open the output.  Nothing was written and
    /// the rendered frames are untouched.
    WriterUnavailable,
}

/// Feed frames `1..=frame_count` to the encoder, in order.  All frames
/// must already exist.  If the encoder cannot open `movie`, the failure
/// is logged and `Assembly::WriterUnavailable` returned rather than an
/// error.
pub fn assemble<T: Real, E: VideoEncoder>(
    encoder: &E,
    spec: &MovieSpec<T>,
    layout: &Layout,
    movie: &Path,
    codec: Codec,
    fps: f64,
) -> Result<Assembly, ZoomError> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(ZoomError::Config(format!(
            "Frame rate must be a positive number, got {}",
            fps
        )));
    }
    let (width, height) = spec.dimensions();
    let size = (u32::from(width), u32::from(height));
    let mut writer = match encoder.open(movie, codec, size, fps) {
        Ok(writer) => writer,
        Err(e) => {
            error!("Cannot open video writer for {}: {}", movie.display(), e);
            return Ok(Assembly::WriterUnavailable);
        }
    };

    let total = spec.frame_count();
    info!(total, path = %movie.display(), %codec, fps, "Assembling video");
    let bar = frame_bar("Assembling", total, 0);
    for index in 1..=total {
        let frame = read_frame(&layout.frame_path(index))?;
        if frame.dimensions() != size {
            return Err(ZoomError::FrameSize {
                index,
                width: frame.width(),
                height: frame.height(),
                expected_width: size.0,
                expected_height: size.1,
            });
        }
        writer.append(&frame)?;
        bar.inc(1);
        if index % NOTIFY_EVERY == 0 {
            bar.suspend(|| info!("Assembled frame {} / {}", index, total));
        }
    }
    writer.finish()?;
    bar.finish();
    info!(frames = total, "Video assembly finished");
    Ok(Assembly::Completed(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codecs_parse_by_fourcc_and_name() {
        assert_eq!("mp4v".parse::<Codec>().unwrap(), Codec::Mp4v);
        assert_eq!("MP4V".parse::<Codec>().unwrap(), Codec::Mp4v);
        assert_eq!("h264".parse::<Codec>().unwrap(), Codec::Avc1);
        assert_eq!("mjpg".parse::<Codec>().unwrap(), Codec::Mjpg);
        assert!("divx".parse::<Codec>().is_err());
    }

    #[test]
    fn codec_displays_as_fourcc() {
        for codec in &[Codec::Mp4v, Codec::Avc1, Codec::Mjpg] {
            assert_eq!(codec.to_string().parse::<Codec>().unwrap(), *codec);
        }
    }

    #[test]
    fn missing_ffmpeg_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let movie = dir.path().join("m.mp4");
        let encoder = FfmpegEncoder::with_program("/nonexistent/ffmpeg-for-tests");
        match encoder.open(&movie, Codec::Mp4v, (4, 4), 30.0) {
            Err(ZoomError::Encoder(_)) => {}
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened a video without an encoder"),
        }
        assert!(!movie.exists());
    }

    #[test]
    fn output_in_a_missing_directory_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let movie = dir.path().join("no").join("such").join("m.mp4");
        match FfmpegEncoder::new().open(&movie, Codec::Mp4v, (4, 4), 30.0) {
            Err(ZoomError::Io { path, .. }) => assert!(path.ends_with("m.mp4")),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened a video nowhere"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn encoder_that_quits_at_startup_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let movie = dir.path().join("m.mp4");
        let encoder = FfmpegEncoder::with_program("false");
        match encoder.open(&movie, Codec::Avc1, (4, 4), 30.0) {
            Err(ZoomError::Encoder(message)) => assert!(message.contains("startup")),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened a video with an encoder that quit"),
        }
        assert!(!movie.exists());
    }
}
