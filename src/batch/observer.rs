//! Observer seam between the batch loop and whatever displays it.
//!
//! Called synchronously on the batch thread after each event. The core keeps
//! no display state; a GUI or terminal front end implements this trait.

use super::progress::ProgressSnapshot;
use image::RgbaImage;
use std::path::Path;

pub trait BatchObserver {
    /// One human-readable log line.
    fn on_log(&mut self, line: &str);

    /// A successful conversion, already scaled for display.
    fn on_preview(&mut self, _source: &Path, _thumbnail: &RgbaImage) {}

    /// Progress after a file completes (and once after the pre-scan).
    fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}
}
