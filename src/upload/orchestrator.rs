use super::progress::{BatchOutcome, UploadProgress};
use super::traits::{UploadError, Uploader};
use crate::error::{LoggerError, Result};
use crate::files::{LogFile, LogFolder};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Handle for an accepted batch.
#[derive(Debug)]
pub struct BatchTicket {
    pub total: usize,
    handle: Option<JoinHandle<()>>,
}

impl BatchTicket {
    /// Waits until the completion handler has run and the batch slot is released.
    pub async fn finished(self) {
        if let Some(handle) = self.handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Upload batch task ended abnormally");
            }
        }
    }
}

/// Ships every current log file through an [`Uploader`] as one batch.
#[derive(Clone)]
pub struct UploadOrchestrator {
    folder: LogFolder,
    uploader: Arc<dyn Uploader>,
    progress: UploadProgress,
    prefix: Option<String>,
    timeout: Option<Duration>,
    max_concurrent: usize,
}

impl UploadOrchestrator {
    pub fn new(folder: LogFolder, uploader: Arc<dyn Uploader>, progress: UploadProgress) -> Self {
        Self {
            folder,
            uploader,
            progress,
            prefix: None,
            timeout: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    /// Remote key for a log file, namespaced under the configured prefix.
    pub fn bucket_file_location(&self, filename: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, filename),
            None => filename.to_string(),
        }
    }

    /// Starts uploading every current log file and returns once the batch is accepted.
    ///
    /// `on_complete` runs exactly once with the aggregate outcome; the batch slot
    /// is released only after it returns. An empty folder completes inline.
    pub fn start_batch_upload<F>(&self, on_complete: F) -> Result<BatchTicket>
    where
        F: FnOnce(BatchOutcome) + Send + 'static,
    {
        if self.progress.is_in_progress() {
            return Err(LoggerError::AlreadyInProgress);
        }
        if !self.uploader.is_configured() {
            return Err(LoggerError::NotConfigured);
        }

        let files = self
            .folder
            .enumerate()
            .map_err(|e| LoggerError::fs(self.folder.root(), e))?;

        if files.is_empty() {
            self.progress.try_begin(0)?;
            debug!("No log files to upload");
            on_complete(BatchOutcome::empty());
            return Ok(BatchTicket {
                total: 0,
                handle: None,
            });
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| LoggerError::NoRuntime)?;

        let total = files.len();
        self.progress.try_begin(total)?;
        // Releases the slot even if the task is dropped unpolled or the handler panics
        let release = ReleaseOnDrop(self.progress.clone());
        info!(total, "Starting upload batch");

        let this = self.clone();
        let handle = runtime.spawn(async move {
            let _release = release;
            this.run_batch(files, on_complete).await
        });

        Ok(BatchTicket {
            total,
            handle: Some(handle),
        })
    }

    /// Runs a batch and waits for its outcome.
    pub async fn upload_all(&self) -> Result<BatchOutcome> {
        let (tx, rx) = oneshot::channel();
        self.start_batch_upload(move |outcome| {
            let _ = tx.send(outcome);
        })?;

        rx.await.map_err(|_| {
            LoggerError::Upload(UploadError::Rejected(
                "upload batch ended without reporting an outcome".to_string(),
            ))
        })
    }

    async fn run_batch<F>(self, files: Vec<LogFile>, on_complete: F)
    where
        F: FnOnce(BatchOutcome) + Send + 'static,
    {
        let mut results = stream::iter(files)
            .map(|file| {
                let this = &self;
                async move {
                    let result = this.upload_one(&file).await;
                    (file, result)
                }
            })
            .buffer_unordered(self.max_concurrent);

        while let Some((file, result)) = results.next().await {
            match &result {
                Ok(()) => debug!(path = %file.path.display(), "Uploaded log file"),
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "Failed to upload log file")
                }
            }
            self.progress.record(result);
        }
        drop(results);

        let outcome = self.progress.outcome();
        info!(
            total = outcome.total,
            completed = outcome.completed,
            failed = outcome.failed,
            success = outcome.success,
            "Upload batch finished"
        );
        on_complete(outcome);
    }

    async fn upload_one(&self, file: &LogFile) -> std::result::Result<(), UploadError> {
        let key = self.bucket_file_location(&file.filename);
        let upload = self.uploader.upload(&file.path, &key);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, upload)
                .await
                .unwrap_or_else(|_| {
                    Err(UploadError::Timeout {
                        key: key.clone(),
                        timeout: limit,
                    })
                }),
            None => upload.await,
        }
    }
}

struct ReleaseOnDrop(UploadProgress);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.finish();
    }
}
