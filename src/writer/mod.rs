use crate::error::{LoggerError, Result};
use crate::files::{LogFile, LogFolder};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;
use tracing::trace;

/// Result of a successful append.
#[derive(Debug, Clone)]
pub struct Appended {
    pub file: LogFile,
    /// True when this append moved the writer onto a different day than the previous one
    pub rolled_over: bool,
}

/// Appends timestamped lines to the file owned by each event's day.
#[derive(Debug)]
pub struct EventWriter {
    folder: LogFolder,
    line_format: String,
    // Held for the whole format+write so lines from concurrent callers never interleave
    active_day: Mutex<Option<NaiveDate>>,
}

impl EventWriter {
    pub fn new(folder: LogFolder, line_format: impl Into<String>) -> Self {
        Self {
            folder,
            line_format: line_format.into(),
            active_day: Mutex::new(None),
        }
    }

    pub fn folder(&self) -> &LogFolder {
        &self.folder
    }

    pub fn format_line(&self, text: &str, at: NaiveDateTime) -> String {
        let mut line = String::with_capacity(text.len() + 32);
        line.push('[');
        let _ = write!(line, "{}", at.format(&self.line_format));
        line.push_str("] ");
        line.push_str(text);
        line.push('\n');
        line
    }

    /// Appends `text` to the file for `at`'s day, creating folder and file on first use.
    pub fn append(&self, text: &str, at: NaiveDateTime) -> Result<Appended> {
        let day = at.date();
        let file = self.folder.log_file(day);

        let mut active_day = self.active_day.lock().unwrap();

        let line = self.format_line(text, at);

        std::fs::create_dir_all(self.folder.root())
            .map_err(|e| LoggerError::fs(self.folder.root(), e))?;

        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file.path)
            .map_err(|e| LoggerError::fs(&file.path, e))?;

        handle
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::fs(&file.path, e))?;

        let rolled_over = *active_day != Some(day);
        *active_day = Some(day);

        trace!(path = %file.path.display(), rolled_over, "Appended event");

        Ok(Appended { file, rolled_over })
    }

    /// Full contents of the file for `date`, or `None` if there is no such file.
    pub fn read_back(&self, date: NaiveDate) -> Result<Option<String>> {
        let file = self.folder.log_file(date);
        match std::fs::read_to_string(&file.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoggerError::fs(&file.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FilenameCodec;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn writer(dir: &TempDir) -> EventWriter {
        let folder = LogFolder::new(
            dir.path().join("logs"),
            FilenameCodec::new("%Y-%m-%d", ".log"),
        );
        EventWriter::new(folder, "%H:%M:%S")
    }

    #[test]
    fn test_format_line() {
        let dir = TempDir::new().unwrap();
        let line = writer(&dir).format_line("started", at(2024, 1, 10, 9, 30));
        assert_eq!(line, "[09:30:00] started\n");
    }

    #[test]
    fn test_append_creates_folder_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);

        writer.append("first", at(2024, 1, 10, 9, 0)).unwrap();
        writer.append("second", at(2024, 1, 10, 9, 1)).unwrap();

        let contents = writer.read_back(at(2024, 1, 10, 0, 0).date()).unwrap().unwrap();
        assert_eq!(contents, "[09:00:00] first\n[09:01:00] second\n");
    }

    #[test]
    fn test_append_never_truncates() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        std::fs::create_dir_all(dir.path().join("logs")).unwrap();
        std::fs::write(dir.path().join("logs/2024-01-10.log"), "existing\n").unwrap();

        writer.append("new", at(2024, 1, 10, 12, 0)).unwrap();

        let contents = writer.read_back(at(2024, 1, 10, 0, 0).date()).unwrap().unwrap();
        assert_eq!(contents, "existing\n[12:00:00] new\n");
    }

    #[test]
    fn test_rollover_detection() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);

        assert!(writer.append("a", at(2024, 1, 10, 23, 59)).unwrap().rolled_over);
        assert!(!writer.append("b", at(2024, 1, 10, 23, 59)).unwrap().rolled_over);
        let next = writer.append("c", at(2024, 1, 11, 0, 0)).unwrap();
        assert!(next.rolled_over);
        assert_eq!(next.file.filename, "2024-01-11.log");
    }

    #[test]
    fn test_read_back_missing_day() {
        let dir = TempDir::new().unwrap();
        let missing = writer(&dir).read_back(at(2024, 1, 1, 0, 0).date()).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let writer = Arc::new(writer(&dir));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let writer = writer.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        writer
                            .append(&format!("thread-{t} line-{i}"), at(2024, 1, 10, 8, 0))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = writer.read_back(at(2024, 1, 10, 0, 0).date()).unwrap().unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.starts_with("[08:00:00] thread-")));
    }
}
