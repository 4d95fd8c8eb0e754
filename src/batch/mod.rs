/// Batch conversion of a whole folder tree
///
/// This module handles:
/// - Pre-scanning the source tree for DDS files
/// - Mirroring the directory structure under the destination
/// - Running the decoding cascade once per file
/// - Progress and ETA reporting through an observer

pub mod observer;
pub mod progress;
pub mod walker;

pub use observer::BatchObserver;
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use walker::{count_dds_files, is_dds, BatchJob, RunSummary, SourceAsset};
