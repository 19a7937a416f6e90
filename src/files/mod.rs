pub mod codec;

pub use codec::FilenameCodec;

use crate::config::StorageConfig;
use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};

/// A daily log file, derived from its date and the current configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub date: NaiveDate,
    pub filename: String,
    pub path: PathBuf,
}

/// The storage folder together with the codec that defines which entries are log files.
#[derive(Debug, Clone)]
pub struct LogFolder {
    root: PathBuf,
    codec: FilenameCodec,
}

impl LogFolder {
    pub fn new(root: impl Into<PathBuf>, codec: FilenameCodec) -> Self {
        Self {
            root: root.into(),
            codec,
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.folder.clone(), FilenameCodec::from_config(storage))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn codec(&self) -> &FilenameCodec {
        &self.codec
    }

    pub fn log_file(&self, date: NaiveDate) -> LogFile {
        let filename = self.codec.encode(date);
        let path = self.root.join(&filename);
        LogFile {
            date,
            filename,
            path,
        }
    }

    /// Lists the current log files, oldest first.
    ///
    /// A missing folder yields an empty set. Directories and entries the codec
    /// does not recognize are skipped.
    pub fn enumerate(&self) -> io::Result<Vec<LogFile>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };

            if let Some(date) = self.codec.decode(&name) {
                files.push(LogFile {
                    date,
                    filename: name,
                    path: entry.path(),
                });
            }
        }

        files.sort_by_key(|f| f.date);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn folder(dir: &TempDir) -> LogFolder {
        LogFolder::new(dir.path(), FilenameCodec::new("%Y-%m-%d", ".log"))
    }

    #[test]
    fn test_log_file_path() {
        let dir = TempDir::new().unwrap();
        let file = folder(&dir).log_file(date(2024, 1, 10));
        assert_eq!(file.filename, "2024-01-10.log");
        assert_eq!(file.path, dir.path().join("2024-01-10.log"));
    }

    #[test]
    fn test_enumerate_missing_folder() {
        let dir = TempDir::new().unwrap();
        let codec = FilenameCodec::new("%Y-%m-%d", ".log");
        let folder = LogFolder::new(dir.path().join("absent"), codec);
        assert!(folder.enumerate().unwrap().is_empty());
    }

    #[test]
    fn test_enumerate_skips_unrelated_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("2024-01-07.log"), "a\n").unwrap();
        std::fs::write(dir.path().join("2024-01-05.log"), "b\n").unwrap();
        std::fs::write(dir.path().join("README.md"), "hi").unwrap();
        std::fs::write(dir.path().join("2024-01-06.txt"), "c\n").unwrap();
        std::fs::create_dir(dir.path().join("2024-01-08.log")).unwrap();

        let files = folder(&dir).enumerate().unwrap();
        let dates: Vec<NaiveDate> = files.iter().map(|f| f.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 5), date(2024, 1, 7)]);
        assert_eq!(files[0].path, dir.path().join("2024-01-05.log"));
    }
}
