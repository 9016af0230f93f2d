//! Progress reporting for the collect passes.
//!
//! The engine never logs through global state directly; each pass receives
//! an observer, so the same code can log through `tracing` in the binary and
//! record events in tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// How often (in merged records) progress is reported.
pub const MERGE_PROGRESS_INTERVAL: u64 = 1000;

/// Receiver of progress events from the collect passes.
pub trait CollectObserver: Send + Sync {
    /// Result files were discovered under the input root.
    fn files_found(&self, count: usize);

    /// A result file was fully read (`index` is 0-based).
    fn file_read(&self, index: usize, path: &Path);

    /// A file had no records and was left out of the margin estimate.
    fn empty_file_skipped(&self, path: &Path);

    /// The global margin was computed.
    fn margin_estimated(&self, margin: f64);

    /// `count` records have been written to the merged output so far.
    fn records_merged(&self, count: u64);

    /// The merge stopped because the configured limit was hit.
    fn limit_reached(&self, limit: usize);
}

// ── Tracing Implementation ──────────────────────────────────────────────────

/// Observer that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CollectObserver for TracingObserver {
    fn files_found(&self, count: usize) {
        info!("{} files found", count);
    }

    fn file_read(&self, index: usize, path: &Path) {
        info!("{} files read. ({})", index + 1, path.display());
    }

    fn empty_file_skipped(&self, path: &Path) {
        warn!("{} has no records, excluding it from the margin estimate", path.display());
    }

    fn margin_estimated(&self, margin: f64) {
        info!("Filtering results where affinity <= {}", margin);
    }

    fn records_merged(&self, count: u64) {
        if count % MERGE_PROGRESS_INTERVAL == 0 {
            info!("{} compounds sorted.", count);
        }
    }

    fn limit_reached(&self, limit: usize) {
        info!("Compound count limit of {} reached.", limit);
    }
}

// ── Recording Implementation for Testing ────────────────────────────────────

/// A single captured event.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectEvent {
    FilesFound(usize),
    FileRead(usize, PathBuf),
    EmptyFileSkipped(PathBuf),
    MarginEstimated(f64),
    LimitReached(usize),
}

/// Observer that keeps every event (except per-record merge progress) in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CollectEvent>>,
    merged: Mutex<u64>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured events in arrival order.
    pub fn events(&self) -> Vec<CollectEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Highest merge count reported.
    pub fn merged(&self) -> u64 {
        self.merged.lock().map(|m| *m).unwrap_or_default()
    }

    fn push(&self, event: CollectEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl CollectObserver for RecordingObserver {
    fn files_found(&self, count: usize) {
        self.push(CollectEvent::FilesFound(count));
    }

    fn file_read(&self, index: usize, path: &Path) {
        self.push(CollectEvent::FileRead(index, path.to_path_buf()));
    }

    fn empty_file_skipped(&self, path: &Path) {
        self.push(CollectEvent::EmptyFileSkipped(path.to_path_buf()));
    }

    fn margin_estimated(&self, margin: f64) {
        self.push(CollectEvent::MarginEstimated(margin));
    }

    fn records_merged(&self, count: u64) {
        if let Ok(mut merged) = self.merged.lock() {
            *merged = count;
        }
    }

    fn limit_reached(&self, limit: usize) {
        self.push(CollectEvent::LimitReached(limit));
    }
}
