use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of days worth of log files to keep besides today's
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

fn default_retention_days() -> i64 {
    7
}

impl Config {
    /// Build a configuration with default settings for `folder` and no remote.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            retention_days: default_retention_days(),
            storage: StorageConfig {
                folder: folder.into(),
                extension: default_extension(),
                filename_format: default_filename_format(),
                line_format: default_line_format(),
            },
            remote: None,
        }
    }

    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub folder: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// strftime pattern used for the date part of each filename
    #[serde(default = "default_filename_format")]
    pub filename_format: String,
    /// strftime pattern prefixed to every logged line
    #[serde(default = "default_line_format")]
    pub line_format: String,
}

fn default_extension() -> String {
    ".log".to_string()
}

fn default_filename_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_line_format() -> String {
    "%Y-%m-%d %H:%M:%S%.3f".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Folder inside the bucket that uploaded files are placed under
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_max_concurrent() -> usize {
    4
}

impl RemoteConfig {
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: default_region(),
            bucket: bucket.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            prefix: None,
            timeout: None,
            max_concurrent: default_max_concurrent(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// True when every field needed to reach the bucket is present and well formed.
    pub fn is_complete(&self) -> bool {
        !self.bucket.trim().is_empty()
            && !self.access_key.is_empty()
            && !self.secret_key.is_empty()
            && reqwest::Url::parse(&self.endpoint).is_ok()
    }
}

// Credentials stay out of debug output.
impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("prefix", &self.prefix)
            .field("timeout", &self.timeout)
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}
