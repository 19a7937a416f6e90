use crate::config::ConfigError;
use crate::upload::UploadError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("remote storage is not configured")]
    NotConfigured,

    #[error("an upload batch is already in progress")]
    AlreadyInProgress,

    #[error("file system error on '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("no async runtime available to drive uploads")]
    NoRuntime,

    #[error("logger has not been initialized")]
    Uninitialized,
}

impl LoggerError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoggerError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;
