use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote object store that log files are shipped to.
///
/// Implementations must tolerate concurrent independent calls.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Whether bucket and credentials are present and usable.
    fn is_configured(&self) -> bool;

    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<(), UploadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("remote returned error status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("upload of '{key}' timed out after {timeout:?}")]
    Timeout { key: String, timeout: Duration },

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("remote storage is not configured")]
    NotConfigured,
}
