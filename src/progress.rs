//! Operator-facing progress bars.

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{msg:>10} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// A bar counting frames, already advanced past the ones that were done
/// before it was created.  When stderr is not a terminal the bar draws
/// nothing.
pub(crate) fn frame_bar(label: &'static str, len: usize, done: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.set_message(label);
    bar.set_position(done as u64);
    bar
}
