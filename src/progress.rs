//! Progress reporting.
//!
//! Extraction and sampling never print anything themselves. Instead they
//! report to a [`ProgressCallback`] supplied through
//! [`ExtractOptions`](crate::ExtractOptions), which lets the command-line
//! tool draw progress bars while tests record the same notifications.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidprep::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{}] {}/{:?}", info.label, info.current, info.total);
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding a video and writing its frames.
    FrameExtraction,
    /// Copying every Nth frame of the scene video.
    SceneSampling,
}

/// A snapshot of progress for one job.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// The job's basename, e.g. `"scene"` or `"left"`.
    pub label: String,
    /// How many items (frames / files) have been processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    ///
    /// For extraction this is the frame count the source reports, which may
    /// differ from the number of frames actually decoded.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known and non-zero.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] because every job of a run
/// reports from its own worker thread through the same callback.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while a job runs.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default observer.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks progress timing for one operation and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    label: String,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        label: &str,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            label: label.to_string(),
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed item and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report();
    }

    fn report(&self) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            label: self.label.clone(),
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        infos: Mutex<Vec<ProgressInfo>>,
    }

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.infos.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn batches_reports_and_always_finishes() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(
            recorder.clone(),
            OperationType::FrameExtraction,
            "left",
            Some(7),
            3,
        );
        for _ in 0..7 {
            tracker.advance();
        }
        tracker.finish();

        let infos = recorder.infos.lock().unwrap();
        let currents: Vec<u64> = infos.iter().map(|info| info.current).collect();
        assert_eq!(currents, vec![3, 6, 7]);
        assert_eq!(infos[2].percentage, Some(100.0));
        assert!(infos.iter().all(|info| info.label == "left"));
    }

    #[test]
    fn zero_total_has_no_percentage() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker =
            ProgressTracker::new(recorder.clone(), OperationType::SceneSampling, "scene", Some(0), 1);
        tracker.finish();

        let infos = recorder.infos.lock().unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].percentage, None);
        assert_eq!(infos[0].estimated_remaining, None);
    }
}
