use crate::config::ConfigError;
use crate::error::{LoggerError, Result};
use crate::files::{LogFile, LogFolder};
use chrono::{Days, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// How far back log files are kept, relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    retention_days: u64,
    reference: NaiveDate,
}

impl RetentionWindow {
    pub fn new(retention_days: i64, reference: NaiveDate) -> Result<Self> {
        let retention_days = u64::try_from(retention_days).map_err(|_| {
            LoggerError::Config(ConfigError::Validation(format!(
                "retention_days must be zero or greater, got {}",
                retention_days
            )))
        })?;

        Ok(Self {
            retention_days,
            reference,
        })
    }

    pub fn retention_days(&self) -> u64 {
        self.retention_days
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Oldest retained day. Files dated exactly on the cutoff are kept.
    pub fn cutoff(&self) -> NaiveDate {
        self.reference
            .checked_sub_days(Days::new(self.retention_days))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn retains(&self, date: NaiveDate) -> bool {
        date >= self.cutoff()
    }
}

#[derive(Debug)]
pub struct PurgeFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Outcome of a best-effort deletion pass.
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes log files that fall outside the retention window.
#[derive(Debug, Clone)]
pub struct RetentionEngine {
    folder: LogFolder,
}

impl RetentionEngine {
    pub fn new(folder: LogFolder) -> Self {
        Self { folder }
    }

    pub fn purge(&self, window: &RetentionWindow) -> Result<PurgeReport> {
        self.purge_older_than(window.cutoff())
    }

    /// Deletes every log file dated strictly before `cutoff`.
    ///
    /// Failing to list the folder aborts the pass; failing to delete a single
    /// file is recorded in the report and the pass continues.
    pub fn purge_older_than(&self, cutoff: NaiveDate) -> Result<PurgeReport> {
        let stale = self
            .list()?
            .into_iter()
            .filter(|file| file.date < cutoff);

        let report = delete_files(stale);
        if !report.removed.is_empty() || !report.failed.is_empty() {
            info!(
                cutoff = %cutoff,
                removed = report.removed.len(),
                failed = report.failed.len(),
                "Retention pass finished"
            );
        }
        Ok(report)
    }

    /// Deletes every log file regardless of its date. Unrelated entries are left alone.
    pub fn remove_all(&self) -> Result<PurgeReport> {
        let report = delete_files(self.list()?);
        info!(
            folder = %self.folder.root().display(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Removed all log files"
        );
        Ok(report)
    }

    fn list(&self) -> Result<Vec<LogFile>> {
        self.folder
            .enumerate()
            .map_err(|e| LoggerError::fs(self.folder.root(), e))
    }
}

fn delete_files(files: impl IntoIterator<Item = LogFile>) -> PurgeReport {
    let mut report = PurgeReport::default();

    for file in files {
        match std::fs::remove_file(&file.path) {
            Ok(()) => {
                debug!(path = %file.path.display(), "Deleted log file");
                report.removed.push(file.path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Already gone, someone else got there first
                report.removed.push(file.path);
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to delete log file");
                report.failed.push(PurgeFailure {
                    path: file.path,
                    source: e,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FilenameCodec;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(days: std::ops::RangeInclusive<u32>) -> (TempDir, LogFolder) {
        let dir = TempDir::new().unwrap();
        let folder = LogFolder::new(dir.path(), FilenameCodec::new("%Y-%m-%d", ".log"));
        for day in days {
            std::fs::write(folder.log_file(date(2024, 1, day)).path, "entry\n").unwrap();
        }
        (dir, folder)
    }

    fn remaining_days(folder: &LogFolder) -> Vec<u32> {
        use chrono::Datelike;
        folder.enumerate().unwrap().iter().map(|f| f.date.day()).collect()
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let window = RetentionWindow::new(3, date(2024, 1, 10)).unwrap();
        assert_eq!(window.cutoff(), date(2024, 1, 7));
        assert!(window.retains(date(2024, 1, 7)));
        assert!(!window.retains(date(2024, 1, 6)));
    }

    #[test]
    fn test_cutoff_crosses_month_and_year() {
        let window = RetentionWindow::new(10, date(2024, 1, 3)).unwrap();
        assert_eq!(window.cutoff(), date(2023, 12, 24));
    }

    #[test]
    fn test_negative_retention_is_config_error() {
        let err = RetentionWindow::new(-1, date(2024, 1, 10)).unwrap_err();
        assert!(matches!(err, LoggerError::Config(_)));
    }

    #[test]
    fn test_purge_keeps_window() {
        let (_dir, folder) = setup(5..=10);
        let engine = RetentionEngine::new(folder.clone());
        let window = RetentionWindow::new(3, date(2024, 1, 10)).unwrap();

        let report = engine.purge(&window).unwrap();

        assert_eq!(report.removed.len(), 2);
        assert!(report.is_clean());
        assert_eq!(remaining_days(&folder), vec![7, 8, 9, 10]);
    }

    #[test]
    fn test_zero_retention_keeps_only_today() {
        let (_dir, folder) = setup(8..=10);
        let engine = RetentionEngine::new(folder.clone());
        let window = RetentionWindow::new(0, date(2024, 1, 10)).unwrap();

        engine.purge(&window).unwrap();
        assert_eq!(remaining_days(&folder), vec![10]);
    }

    #[test]
    fn test_purge_leaves_unrelated_files() {
        let (dir, folder) = setup(1..=2);
        std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        RetentionEngine::new(folder).purge_older_than(date(2024, 2, 1)).unwrap();
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_remove_all() {
        let (dir, folder) = setup(1..=4);
        std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let report = RetentionEngine::new(folder.clone()).remove_all().unwrap();
        assert_eq!(report.removed.len(), 4);
        assert!(folder.enumerate().unwrap().is_empty());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_purge_missing_folder_is_noop() {
        let dir = TempDir::new().unwrap();
        let codec = FilenameCodec::new("%Y-%m-%d", ".log");
        let folder = LogFolder::new(dir.path().join("nothing"), codec);
        let report = RetentionEngine::new(folder)
            .purge_older_than(date(2024, 1, 1))
            .unwrap();
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_failed_delete_does_not_stop_pass() {
        let (dir, folder) = setup(1..=3);
        let mut files = folder.enumerate().unwrap();

        // A path below a regular file cannot be removed (ENOTDIR)
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a folder").unwrap();
        let stuck = LogFile {
            date: date(2024, 1, 2),
            filename: "2024-01-02.log".to_string(),
            path: blocker.join("2024-01-02.log"),
        };
        files.insert(1, stuck);

        let report = delete_files(files);

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, blocker.join("2024-01-02.log"));
        assert!(!report.is_clean());
        assert_eq!(report.removed.len(), 3);
        assert!(folder.enumerate().unwrap().is_empty());
    }
}
