//! Recursive batch conversion of a source tree into a mirrored PNG tree.
//!
//! The tree is walked twice: once to count DDS files so progress has a
//! fixed denominator, then again to mirror directories and convert files.

use super::observer::BatchObserver;
use super::progress::ProgressTracker;
use crate::cascade::Cascade;
use crate::config::ConvertConfig;
use crate::error::BatchError;
use crate::preview;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const DDS_EXTENSION: &str = "dds";
const PNG_EXTENSION: &str = "png";

/// True for any file name ending in `.dds`, case-insensitive.
pub fn is_dds(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(DDS_EXTENSION))
        .unwrap_or(false)
}

/// Pre-scan: count DDS files below `root`.
pub fn count_dds_files(root: &Path) -> usize {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_dds(e.path()))
        .count()
}

/// One input file discovered during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    /// Full path to the DDS file
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative: PathBuf,
}

impl SourceAsset {
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));
        Self { path, relative }
    }

    /// Mirrored output path with the extension swapped for `.png`.
    pub fn output_path(&self, destination_root: &Path) -> PathBuf {
        destination_root
            .join(&self.relative)
            .with_extension(PNG_EXTENSION)
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Files found by the pre-scan
    pub total: usize,
    /// Files handled, whatever the outcome
    pub processed: usize,
    pub converted: usize,
    pub failed: usize,
    /// Files that vanished between the scan and their turn
    pub skipped: usize,
    pub elapsed_secs: f64,
}

/// One conversion run from a source root to a destination root.
pub struct BatchJob<'a> {
    source_root: PathBuf,
    destination_root: PathBuf,
    cascade: &'a Cascade,
    preview_size: u32,
}

impl<'a> BatchJob<'a> {
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        cascade: &'a Cascade,
        config: &ConvertConfig,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            cascade,
            preview_size: config.preview_size,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Reject runs that cannot start at all.
    fn check_roots(&self) -> Result<(), BatchError> {
        if self.source_root.as_os_str().is_empty() || self.destination_root.as_os_str().is_empty()
        {
            return Err(BatchError::MissingRoot);
        }
        if !self.source_root.is_dir() {
            return Err(BatchError::NotADirectory(self.source_root.clone()));
        }
        fs::create_dir_all(&self.destination_root).map_err(|source| BatchError::CreateDir {
            path: self.destination_root.clone(),
            source,
        })
    }

    /// Convert every DDS file under the source root.
    ///
    /// Per-file failures are logged and counted; only the precondition check
    /// can return an error.
    pub fn run(&self, observer: &mut dyn BatchObserver) -> Result<RunSummary, BatchError> {
        self.check_roots()?;

        let started_at = Utc::now();
        let started = Instant::now();
        observer.on_log("Starting batch conversion...");

        let total = count_dds_files(&self.source_root);
        info!("🔍 Found {} DDS files in {}", total, self.source_root.display());

        let mut progress = ProgressTracker::started_at(total, started);
        observer.on_progress(&progress.snapshot());

        let mut converted = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for entry in WalkDir::new(&self.source_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("⚠️  Skipping unreadable entry: {}", err);
                    None
                }
            })
        {
            if entry.file_type().is_dir() {
                self.mirror_dir(entry.path());
                continue;
            }
            if !is_dds(entry.path()) {
                continue;
            }

            let asset = SourceAsset::new(&self.source_root, entry.into_path());
            match self.convert_one(&asset, observer) {
                FileOutcome::Converted => converted += 1,
                FileOutcome::Failed => failed += 1,
                FileOutcome::Vanished => skipped += 1,
            }

            let snapshot = progress.record();
            observer.on_progress(&snapshot);
        }

        let elapsed = started.elapsed().as_secs_f64();
        observer.on_log(&format!(
            "Batch conversion completed in {:.2} seconds.",
            elapsed
        ));
        info!(
            "✅ Batch complete: {} converted, {} failed, {} skipped",
            converted, failed, skipped
        );

        Ok(RunSummary {
            started_at,
            source: self.source_root.clone(),
            destination: self.destination_root.clone(),
            total,
            processed: progress.processed(),
            converted,
            failed,
            skipped,
            elapsed_secs: elapsed,
        })
    }

    /// Create the destination counterpart of a source directory.
    fn mirror_dir(&self, dir: &Path) {
        let relative = dir.strip_prefix(&self.source_root).unwrap_or(Path::new(""));
        let target = self.destination_root.join(relative);
        if target.is_dir() {
            return;
        }
        if let Err(e) = fs::create_dir_all(&target) {
            // Files below will fail to persist and be logged individually.
            warn!("⚠️  Could not create {}: {}", target.display(), e);
        } else {
            debug!("📁 Created {}", target.display());
        }
    }

    fn convert_one(&self, asset: &SourceAsset, observer: &mut dyn BatchObserver) -> FileOutcome {
        let input = &asset.path;
        if !input.exists() {
            observer.on_log(&format!("Input file does not exist: {}", input.display()));
            return FileOutcome::Vanished;
        }

        let output = asset.output_path(&self.destination_root);
        let outcome = self.cascade.convert(input, &output);

        for failure in &outcome.failures {
            observer.on_log(&format!(
                "{} failed to convert {}: {}",
                failure.decoder,
                input.display(),
                failure.reason
            ));
        }

        match outcome.image {
            Some(image) => {
                let thumbnail = preview::thumbnail(&image, self.preview_size);
                observer.on_preview(input, &thumbnail);
                observer.on_log(&format!(
                    "Converted {} to {}.",
                    input.display(),
                    output.display()
                ));
                FileOutcome::Converted
            }
            None => {
                observer.on_log(&format!("Failed to convert {}.", input.display()));
                FileOutcome::Failed
            }
        }
    }
}

enum FileOutcome {
    Converted,
    Failed,
    Vanished,
}
