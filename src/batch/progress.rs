//! Progress and ETA for a batch run.
//!
//! The total is fixed once the pre-scan finishes. ETA is a single linear
//! extrapolation over the whole run, recomputed after every file.

use std::time::{Duration, Instant};

/// Point-in-time view handed to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    /// 0.0..=100.0
    pub percentage: f64,
    pub elapsed: Duration,
    /// Whole seconds remaining; 0 before the first file completes.
    pub eta_seconds: u64,
}

impl ProgressSnapshot {
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    pub fn eta_label(&self) -> String {
        format!("ETA: {} seconds", self.eta_seconds)
    }
}

/// Counts processed files against the pre-scanned total.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: usize,
    processed: usize,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self::started_at(total, Instant::now())
    }

    pub fn started_at(total: usize, started: Instant) -> Self {
        Self {
            total,
            processed: 0,
            started,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Count one more file, successful or not.
    pub fn record(&mut self) -> ProgressSnapshot {
        self.processed += 1;
        self.snapshot()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> ProgressSnapshot {
        let elapsed = now.saturating_duration_since(self.started);
        ProgressSnapshot {
            processed: self.processed,
            total: self.total,
            percentage: percentage(self.processed, self.total),
            elapsed,
            eta_seconds: eta_seconds(elapsed, self.processed, self.total),
        }
    }
}

/// `processed / total * 100`, capped at 100. An empty run counts as complete.
pub fn percentage(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (processed as f64 / total as f64 * 100.0).min(100.0)
}

/// `elapsed * (total - processed) / processed`, truncated to whole seconds.
pub fn eta_seconds(elapsed: Duration, processed: usize, total: usize) -> u64 {
    if processed == 0 {
        return 0;
    }
    let remaining = total.saturating_sub(processed);
    (elapsed.as_secs_f64() * remaining as f64 / processed as f64) as u64
}
