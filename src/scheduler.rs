//! The ResumableFrameScheduler: renders every frame of a movie that is
//! not already on disk, a batch of threads at a time.
//!
//! Rendering can be interrupted at any point (there is no cancellation,
//! only process termination) and restarted later.  On restart the
//! scheduler scans the image directory for consecutive frames that
//! already exist, steps back one frame, and carries on from there.  The
//! step back is deliberate: the last frame written before an
//! interruption may be truncated on disk, and rendering it again costs
//! one frame of work while guaranteeing no corrupt frame ends up in the
//! movie.

use crossbeam::thread::ScopedJoinHandle;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::complex::Real;
use crate::errors::ZoomError;
use crate::gradient::GradientTable;
use crate::layout::Layout;
use crate::progress::frame_bar;
use crate::render::{render_frame, write_frame};
use crate::schedule::{MovieSpec, ScheduledFrame, ZoomSchedule};

/// What a call to `FrameScheduler::run` did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderReport {
    /// The first frame rendered by this run; `total + 1` if there was
    /// nothing to do.
    pub resumed_from: usize,
    /// How many frames this run rendered.
    pub rendered: usize,
    /// The number of frames in the movie.
    pub total: usize,
}

/// Drives the rendering of a whole movie.  Everything it holds is
/// read-only and shared by reference with its worker threads.
#[derive(Debug)]
pub struct FrameScheduler<'a, T: Real> {
    spec: &'a MovieSpec<T>,
    gradient: &'a GradientTable,
    layout: &'a Layout,
    batch_size: usize,
}

impl<'a, T: Real> FrameScheduler<'a, T> {
    /// `batch_size` is the number of frames (and threads) in flight at
    /// once.
    pub fn new(
        spec: &'a MovieSpec<T>,
        gradient: &'a GradientTable,
        layout: &'a Layout,
        batch_size: usize,
    ) -> Result<Self, ZoomError> {
        if batch_size == 0 {
            return Err(ZoomError::Config(
                "At least one worker thread is required".to_string(),
            ));
        }
        Ok(FrameScheduler {
            spec,
            gradient,
            layout,
            batch_size,
        })
    }

    /// The schedule, positioned at the first frame that needs
    /// rendering.  Walks forward while frame files exist, then backs up
    /// one frame so the most recent one gets redone.
    pub fn resume_point(&self) -> ZoomSchedule<T> {
        let mut schedule = self.spec.schedule();
        let mut last_existing = None;
        loop {
            let mut ahead = schedule.clone();
            match ahead.next() {
                Some(frame) if self.layout.frame_path(frame.index).exists() => {
                    last_existing = Some(schedule);
                    schedule = ahead;
                }
                _ => break,
            }
        }
        last_existing.unwrap_or(schedule)
    }

    /// Render one frame and write it to its file.
    pub fn render_one(&self, frame: ScheduledFrame<T>) -> Result<PathBuf, ZoomError> {
        let viewport = self.spec.viewport(frame.unit);
        let image = render_frame(&viewport, self.gradient);
        let path = self.layout.frame_path(frame.index);
        write_frame(&image, &path)?;
        Ok(path)
    }

    /// Render every frame from the resume point on.  Each batch runs to
    /// completion before the next one is planned; if any frame of a
    /// batch fails, the run stops after that batch with the first
    /// failure.  Frames already written stay on disk for the next run.
    pub fn run(&self) -> Result<RenderReport, ZoomError> {
        let total = self.spec.frame_count();
        let mut schedule = self.resume_point();
        let resumed_from = schedule
            .clone()
            .next()
            .map_or(total + 1, |frame| frame.index);
        info!(
            resumed_from,
            total,
            threads = self.batch_size,
            "Rendering frames"
        );

        let bar = frame_bar("Rendering", total, resumed_from - 1);
        let mut rendered = 0;
        loop {
            let batch: Vec<ScheduledFrame<T>> =
                schedule.by_ref().take(self.batch_size).collect();
            let last = match batch.last() {
                Some(frame) => frame.index,
                None => break,
            };
            self.render_batch(&batch, |frame| self.render_one(frame))?;
            rendered += batch.len();
            bar.set_position(last as u64);
            bar.suspend(|| info!("Rendered frame {} / {}", last, total));
        }
        bar.finish();
        info!(rendered, "Frame rendering finished");

        Ok(RenderReport {
            resumed_from,
            rendered,
            total,
        })
    }

    /// One thread per frame, each running `work`, all joined before
    /// returning.  The join is the only synchronization: workers share
    /// nothing mutable and each writes its own file.  A worker that
    /// panics fails the batch with the index of its frame.
    fn render_batch<F>(&self, batch: &[ScheduledFrame<T>], work: F) -> Result<(), ZoomError>
    where
        F: Fn(ScheduledFrame<T>) -> Result<PathBuf, ZoomError> + Sync,
    {
        let first = batch.first().map_or(0, |frame| frame.index);
        let work = &work;
        let results: Vec<(usize, Result<PathBuf, ZoomError>)> = crossbeam::scope(|spawner| {
            let handles: Vec<(usize, ScopedJoinHandle<Result<PathBuf, ZoomError>>)> = batch
                .iter()
                .map(|&frame| (frame.index, spawner.spawn(move |_| work(frame))))
                .collect();

            handles
                .into_iter()
                .map(|(index, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or_else(|_| Err(ZoomError::WorkerPanicked(index)));
                    (index, result)
                })
                .collect()
        })
        .map_err(|_| ZoomError::WorkerPanicked(first))?;

        let mut failure = None;
        for (index, result) in results {
            match result {
                Ok(path) => debug!(index, path = %path.display(), "Frame written"),
                Err(e) => {
                    error!(index, "Frame failed: {}", e);
                    failure = failure.or(Some(e));
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ComplexValue;
    use std::fs;

    fn spec() -> MovieSpec<f64> {
        MovieSpec::new(ComplexValue::new(-0.75, 0.1), 0.05, 0.01, 0.8, 8, 6, 50).unwrap()
    }

    fn gradient() -> GradientTable {
        GradientTable::build(30.0, 50.0, 70.0).unwrap()
    }

    fn layout(dir: &tempfile::TempDir) -> Layout {
        let layout = Layout::new(dir.path());
        layout.create().unwrap();
        layout
    }

    #[test]
    fn zero_threads_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let (spec, gradient, layout) = (spec(), gradient(), layout(&dir));
        assert!(FrameScheduler::new(&spec, &gradient, &layout, 0).is_err());
    }

    #[test]
    fn fresh_directory_starts_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let (spec, gradient, layout) = (spec(), gradient(), layout(&dir));
        let scheduler = FrameScheduler::new(&spec, &gradient, &layout, 2).unwrap();
        let next = scheduler.resume_point().next().unwrap();
        assert_eq!(next.index, 1);
        assert_eq!(next.unit, spec.unit_before());
    }

    #[test]
    fn resume_redoes_the_last_existing_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (spec, gradient, layout) = (spec(), gradient(), layout(&dir));
        for index in 1..=3 {
            fs::write(layout.frame_path(index), b"").unwrap();
        }
        // A gap: frame 5 does not count, the scan stops at 4.
        fs::write(layout.frame_path(5), b"").unwrap();
        let scheduler = FrameScheduler::new(&spec, &gradient, &layout, 2).unwrap();
        let next = scheduler.resume_point().next().unwrap();
        let expected = spec.schedule().nth(2).unwrap();
        assert_eq!(next, expected);
        assert_eq!(next.index, 3);
    }

    #[test]
    fn complete_movie_redoes_only_the_final_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (spec, gradient, layout) = (spec(), gradient(), layout(&dir));
        let total = spec.frame_count();
        for index in 1..=total {
            fs::write(layout.frame_path(index), b"").unwrap();
        }
        let scheduler = FrameScheduler::new(&spec, &gradient, &layout, 3).unwrap();
        let mut resume = scheduler.resume_point();
        assert_eq!(resume.next().map(|f| f.index), Some(total));
        assert_eq!(resume.next(), None);
    }

    #[test]
    fn run_renders_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (spec, gradient, layout) = (spec(), gradient(), layout(&dir));
        let total = spec.frame_count();
        let scheduler = FrameScheduler::new(&spec, &gradient, &layout, 3).unwrap();
        let report = scheduler.run().unwrap();
        assert_eq!(
            report,
            RenderReport {
                resumed_from: 1,
                rendered: total,
                total
            }
        );
        for index in 1..=total {
            assert!(layout.frame_path(index).is_file());
        }
        assert!(!layout.frame_path(total + 1).exists());
    }

    #[test]
    fn batch_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (spec, gradient) = (spec(), gradient());
        // The image directory is never created, so every write fails.
        let layout = Layout::new(dir.path().join("nowhere"));
        let scheduler = FrameScheduler::new(&spec, &gradient, &layout, 2).unwrap();
        match scheduler.run() {
            Err(ZoomError::Io { path, .. }) => assert!(path.ends_with("1.png")),
            other => panic!("expected a write failure, got {:?}", other),
        }
    }

    #[test]
    fn a_panicking_worker_fails_its_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (spec, gradient, layout) = (spec(), gradient(), layout(&dir));
        let scheduler = FrameScheduler::new(&spec, &gradient, &layout, 3).unwrap();
        let batch: Vec<ScheduledFrame<f64>> = spec.schedule().take(3).collect();
        let outcome = scheduler.render_batch(&batch, |frame| {
            if frame.index == 2 {
                panic!("frame 2 cannot be drawn");
            }
            scheduler.render_one(frame)
        });
        match outcome {
            Err(ZoomError::WorkerPanicked(2)) => {}
            other => panic!("expected frame 2 to be reported, got {:?}", other),
        }
        // The rest of the batch still ran to completion.
        assert!(layout.frame_path(1).is_file());
        assert!(!layout.frame_path(2).exists());
        assert!(layout.frame_path(3).is_file());
    }
}
