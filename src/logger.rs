use crate::config::{validate_config, Config};
use crate::error::{LoggerError, Result};
use crate::files::{LogFile, LogFolder};
use crate::retention::{PurgeReport, RetentionEngine, RetentionWindow};
use crate::upload::{
    BatchOutcome, BatchTicket, HttpUploader, UploadOrchestrator, UploadProgress,
    UploadProgressSnapshot, Uploader,
};
use crate::writer::{Appended, EventWriter};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Components derived from one configuration. Replaced wholesale on re-initialization.
struct Components {
    config: Config,
    writer: EventWriter,
    retention: RetentionEngine,
    orchestrator: UploadOrchestrator,
}

impl Components {
    fn build(
        config: Config,
        uploader: Arc<dyn Uploader>,
        progress: UploadProgress,
    ) -> Result<Self> {
        validate_config(&config)?;

        let folder = LogFolder::from_config(&config.storage);
        let writer = EventWriter::new(folder.clone(), config.storage.line_format.clone());
        let retention = RetentionEngine::new(folder.clone());

        let remote = config.remote.as_ref();
        let orchestrator = UploadOrchestrator::new(folder, uploader, progress)
            .with_prefix(remote.and_then(|r| r.prefix.clone()))
            .with_timeout(remote.and_then(|r| r.timeout))
            .with_max_concurrent(remote.map(|r| r.max_concurrent).unwrap_or(1));

        Ok(Self {
            config,
            writer,
            retention,
            orchestrator,
        })
    }
}

/// Owns the configuration and the live upload state, and exposes the public operations.
pub struct Logger {
    components: RwLock<Arc<Components>>,
    progress: UploadProgress,
}

impl Logger {
    /// Creates a logger that uploads through [`HttpUploader`].
    pub fn new(config: Config) -> Result<Self> {
        let uploader = Arc::new(HttpUploader::new(config.remote.clone())?);
        Self::with_uploader(config, uploader)
    }

    pub fn with_uploader(config: Config, uploader: Arc<dyn Uploader>) -> Result<Self> {
        let progress = UploadProgress::new();
        let components = Components::build(config, uploader, progress.clone())?;
        info!(
            folder = %components.config.storage.folder.display(),
            retention_days = components.config.retention_days,
            "Logger initialized"
        );

        Ok(Self {
            components: RwLock::new(Arc::new(components)),
            progress,
        })
    }

    /// Replaces the whole configuration. Upload progress carries over.
    pub fn initialize(&self, config: Config) -> Result<()> {
        let uploader = Arc::new(HttpUploader::new(config.remote.clone())?);
        self.initialize_with_uploader(config, uploader)
    }

    pub fn initialize_with_uploader(
        &self,
        config: Config,
        uploader: Arc<dyn Uploader>,
    ) -> Result<()> {
        let components = Components::build(config, uploader, self.progress.clone())?;
        info!(
            folder = %components.config.storage.folder.display(),
            retention_days = components.config.retention_days,
            "Logger re-initialized"
        );
        *self.components.write().unwrap() = Arc::new(components);
        Ok(())
    }

    fn current(&self) -> Arc<Components> {
        self.components.read().unwrap().clone()
    }

    pub fn config(&self) -> Config {
        self.current().config.clone()
    }

    pub fn retention_days(&self) -> i64 {
        self.current().config.retention_days
    }

    pub fn folder_location(&self) -> PathBuf {
        self.current().config.storage.folder.clone()
    }

    pub fn filename_extension(&self) -> String {
        self.current().writer.folder().codec().extension().to_string()
    }

    /// Logs `text` with the current local time.
    pub fn log_event(&self, text: &str) -> Result<()> {
        self.log_event_at(text, Local::now().naive_local()).map(|_| ())
    }

    /// Logs `text` as if it happened at `at`. The first event of a new day
    /// triggers a retention pass relative to that day.
    pub fn log_event_at(&self, text: &str, at: NaiveDateTime) -> Result<Appended> {
        let components = self.current();
        let appended = components.writer.append(text, at)?;

        if appended.rolled_over {
            if let Err(e) = Self::purge(&components, at.date()) {
                warn!(error = %e, "Retention pass after rollover failed");
            }
        }

        Ok(appended)
    }

    /// Runs a retention pass relative to today.
    pub fn enforce_retention(&self) -> Result<PurgeReport> {
        self.enforce_retention_on(Local::now().date_naive())
    }

    pub fn enforce_retention_on(&self, today: NaiveDate) -> Result<PurgeReport> {
        Self::purge(&self.current(), today)
    }

    fn purge(components: &Components, today: NaiveDate) -> Result<PurgeReport> {
        let window = RetentionWindow::new(components.config.retention_days, today)?;
        components.retention.purge(&window)
    }

    pub fn read_log_file(&self, date: NaiveDate) -> Result<Option<String>> {
        self.current().writer.read_back(date)
    }

    pub fn log_files(&self) -> Result<Vec<LogFile>> {
        let components = self.current();
        let folder = components.writer.folder();
        folder
            .enumerate()
            .map_err(|e| LoggerError::fs(folder.root(), e))
    }

    /// Deletes every log file, ignoring the retention window.
    pub fn remove_all_log_files(&self) -> Result<PurgeReport> {
        self.current().retention.remove_all()
    }

    /// Starts a batch upload of every current log file. See
    /// [`UploadOrchestrator::start_batch_upload`].
    pub fn upload_all_files<F>(&self, on_complete: F) -> Result<BatchTicket>
    where
        F: FnOnce(BatchOutcome) + Send + 'static,
    {
        self.current().orchestrator.start_batch_upload(on_complete)
    }

    pub async fn upload_all(&self) -> Result<BatchOutcome> {
        let orchestrator = self.current().orchestrator.clone();
        orchestrator.upload_all().await
    }

    pub fn upload_progress(&self) -> UploadProgressSnapshot {
        self.progress.snapshot()
    }

    pub fn bucket_file_location(&self, filename: &str) -> String {
        self.current().orchestrator.bucket_file_location(filename)
    }
}
