use crate::config::StorageConfig;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write;

/// Bidirectional mapping between a calendar day and a log filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameCodec {
    format: String,
    extension: String,
}

impl FilenameCodec {
    /// `extension` gets a leading dot if it is non-empty and lacks one.
    pub fn new(format: &str, extension: &str) -> Self {
        let extension = if extension.is_empty() || extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };

        Self {
            format: format.to_string(),
            extension,
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(&storage.filename_format, &storage.extension)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn encode(&self, date: NaiveDate) -> String {
        let mut filename = String::new();
        // An invalid pattern leaves the date part empty instead of panicking;
        // check_round_trip rejects such patterns at config time.
        let _ = write!(filename, "{}", date.format(&self.format));
        filename.push_str(&self.extension);
        filename
    }

    /// Returns `None` for anything that is not exactly a filename this codec produces.
    pub fn decode(&self, filename: &str) -> Option<NaiveDate> {
        let stem = filename.strip_suffix(self.extension.as_str())?;
        let date = NaiveDate::parse_from_str(stem, &self.format).ok()?;

        // Reject lenient parses such as unpadded days
        (self.encode(date) == filename).then_some(date)
    }

    /// Verifies that the pattern is valid, stays inside one folder and
    /// distinguishes every calendar day.
    pub fn check_round_trip(&self) -> Result<(), String> {
        if StrftimeItems::new(&self.format).any(|item| matches!(item, Item::Error)) {
            return Err("is not a valid strftime pattern".to_string());
        }

        let probes = [
            (1999, 10, 1),
            (2023, 12, 31),
            (2024, 1, 5),
            (2024, 1, 6),
            (2024, 2, 29),
            (2024, 11, 5),
        ];

        let mut seen = Vec::with_capacity(probes.len());
        for (y, m, d) in probes {
            let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
                continue;
            };
            let filename = self.encode(date);

            if filename.contains('/') || filename.contains('\\') {
                return Err("must not produce path separators".to_string());
            }
            if seen.contains(&filename) {
                return Err("must encode the full year, month and day".to_string());
            }
            if self.decode(&filename) != Some(date) {
                return Err(format!("cannot be parsed back from '{}'", filename));
            }
            seen.push(filename);
        }

        Ok(())
    }
}
