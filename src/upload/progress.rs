use super::traits::UploadError;
use crate::error::{LoggerError, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ProgressState {
    in_progress: bool,
    total: usize,
    completed: usize,
    failed: usize,
    last_error: Option<String>,
    pending_error: Option<UploadError>,
}

/// Point-in-time view of the upload counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadProgressSnapshot {
    pub in_progress: bool,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub last_error: Option<String>,
}

/// Aggregate result of one batch, delivered exactly once.
#[derive(Debug)]
pub struct BatchOutcome {
    pub success: bool,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Most recent per-file failure, if any
    pub error: Option<UploadError>,
}

impl BatchOutcome {
    pub(crate) fn empty() -> Self {
        Self {
            success: true,
            total: 0,
            completed: 0,
            failed: 0,
            error: None,
        }
    }
}

/// Shared upload counters. Every mutation goes through one mutex so
/// `completed <= total` and the single-batch flag hold under racing completions.
#[derive(Debug, Clone, Default)]
pub struct UploadProgress {
    state: Arc<Mutex<ProgressState>>,
}

impl UploadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UploadProgressSnapshot {
        let state = self.state.lock().unwrap();
        UploadProgressSnapshot {
            in_progress: state.in_progress,
            total: state.total,
            completed: state.completed,
            failed: state.failed,
            last_error: state.last_error.clone(),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.state.lock().unwrap().in_progress
    }

    /// Clears all counters and the in-progress flag.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = ProgressState::default();
    }

    /// Claims the batch slot for `total` files. A batch of zero files is
    /// recorded as already finished and leaves the slot free.
    pub(crate) fn try_begin(&self, total: usize) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.in_progress {
            return Err(LoggerError::AlreadyInProgress);
        }

        *state = ProgressState {
            in_progress: total > 0,
            total,
            ..ProgressState::default()
        };
        Ok(())
    }

    pub(crate) fn record(&self, result: std::result::Result<(), UploadError>) {
        let mut state = self.state.lock().unwrap();
        if state.completed >= state.total {
            return;
        }

        state.completed += 1;
        if let Err(e) = result {
            state.failed += 1;
            state.last_error = Some(e.to_string());
            state.pending_error = Some(e);
        }
    }

    /// Builds the outcome of the running batch. The slot stays claimed until `finish`.
    pub(crate) fn outcome(&self) -> BatchOutcome {
        let mut state = self.state.lock().unwrap();
        let error = state.pending_error.take();
        BatchOutcome {
            success: error.is_none() && state.failed == 0,
            total: state.total,
            completed: state.completed,
            failed: state.failed,
            error,
        }
    }

    /// Releases the batch slot. Counters keep describing the last batch.
    pub(crate) fn finish(&self) {
        self.state.lock().unwrap().in_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_rejected_without_touching_counters() {
        let progress = UploadProgress::new();
        progress.try_begin(3).unwrap();
        progress.record(Ok(()));

        let err = progress.try_begin(5).unwrap_err();
        assert!(matches!(err, LoggerError::AlreadyInProgress));

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.completed, 1);
        assert!(snapshot.in_progress);
    }

    #[test]
    fn test_empty_begin_respects_running_batch() {
        let progress = UploadProgress::new();
        progress.try_begin(2).unwrap();

        let err = progress.try_begin(0).unwrap_err();
        assert!(matches!(err, LoggerError::AlreadyInProgress));
        assert_eq!(progress.snapshot().total, 2);

        progress.finish();
        progress.try_begin(0).unwrap();
        let snapshot = progress.snapshot();
        assert!(!snapshot.in_progress);
        assert_eq!((snapshot.total, snapshot.completed), (0, 0));
    }

    #[test]
    fn test_last_error_wins() {
        let progress = UploadProgress::new();
        progress.try_begin(3).unwrap();
        progress.record(Err(UploadError::Rejected("first".into())));
        progress.record(Ok(()));
        progress.record(Err(UploadError::Rejected("second".into())));

        let outcome = progress.outcome();
        assert!(!outcome.success);
        assert_eq!(outcome.completed, 3);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.error.unwrap().to_string(), "upload rejected: second");
        assert!(progress.is_in_progress());

        progress.finish();
        let snapshot = progress.snapshot();
        assert!(!snapshot.in_progress);
        assert_eq!(snapshot.last_error.as_deref(), Some("upload rejected: second"));
    }

    #[test]
    fn test_completed_never_exceeds_total() {
        let progress = UploadProgress::new();
        progress.try_begin(1).unwrap();
        progress.record(Ok(()));
        progress.record(Ok(()));
        assert_eq!(progress.snapshot().completed, 1);
    }

    #[test]
    fn test_reset() {
        let progress = UploadProgress::new();
        progress.try_begin(2).unwrap();
        progress.reset();
        assert_eq!(progress.snapshot(), UploadProgressSnapshot::default());
        progress.try_begin(1).unwrap();
    }
}
