//! ErrorTracker 実装
//!
//! - TracingErrorTracker: tracing の error イベントとして出力する（本番用）
//! - RecordingErrorTracker: 記録をメモリに保持する（テスト・CLI のサマリ用）

use std::sync::Mutex;

use tracing::error;

use crate::ports::{ErrorTracker, TrackingContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorTracker;

impl ErrorTracker for TracingErrorTracker {
    fn track_exception(&self, err: &(dyn std::error::Error + 'static), context: TrackingContext) {
        let source = err.source().map(|s| s.to_string());
        error!(
            error = %err,
            source = source.as_deref(),
            context = ?context,
            "tracked exception"
        );
    }
}

/// One error captured by [`RecordingErrorTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedError {
    pub message: String,
    pub context: TrackingContext,
}

/// Keeps every tracked error and forwards it to an inner tracker.
pub struct RecordingErrorTracker<T = TracingErrorTracker> {
    inner: T,
    tracked: Mutex<Vec<TrackedError>>,
}

impl RecordingErrorTracker {
    pub fn new() -> Self {
        Self::wrapping(TracingErrorTracker)
    }
}

impl Default for RecordingErrorTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ErrorTracker> RecordingErrorTracker<T> {
    pub fn wrapping(inner: T) -> Self {
        Self {
            inner,
            tracked: Mutex::new(Vec::new()),
        }
    }

    pub fn tracked(&self) -> Vec<TrackedError> {
        self.tracked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl<T: ErrorTracker> ErrorTracker for RecordingErrorTracker<T> {
    fn track_exception(&self, err: &(dyn std::error::Error + 'static), context: TrackingContext) {
        self.tracked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(TrackedError {
                message: err.to_string(),
                context: context.clone(),
            });
        self.inner.track_exception(err, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_tracker_keeps_message_and_context() {
        let tracker = RecordingErrorTracker::new();
        let err = std::io::Error::other("boom");
        let context = TrackingContext::from([("job_id", "job-1".to_string())]);

        tracker.track_exception(&err, context.clone());

        assert_eq!(
            tracker.tracked(),
            vec![TrackedError {
                message: "boom".to_string(),
                context,
            }]
        );
    }
}
