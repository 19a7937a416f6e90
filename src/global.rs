//! Process-wide logger for callers that want a single shared entry point.
//!
//! Library code should pass a [`Logger`] around explicitly; this holder only
//! wraps one instance behind a mutex.

use crate::config::Config;
use crate::error::{LoggerError, Result};
use crate::logger::Logger;
use crate::upload::{BatchOutcome, BatchTicket, Uploader};
use std::sync::{Arc, Mutex};

static SHARED: Mutex<Option<Arc<Logger>>> = Mutex::new(None);

/// Creates the shared logger, or overwrites its configuration if it already exists.
pub fn initialize(config: Config) -> Result<Arc<Logger>> {
    let mut shared = SHARED.lock().unwrap();
    match shared.as_ref() {
        Some(logger) => {
            logger.initialize(config)?;
            Ok(logger.clone())
        }
        None => {
            let logger = Arc::new(Logger::new(config)?);
            *shared = Some(logger.clone());
            Ok(logger)
        }
    }
}

pub fn initialize_with_uploader(
    config: Config,
    uploader: Arc<dyn Uploader>,
) -> Result<Arc<Logger>> {
    let mut shared = SHARED.lock().unwrap();
    match shared.as_ref() {
        Some(logger) => {
            logger.initialize_with_uploader(config, uploader)?;
            Ok(logger.clone())
        }
        None => {
            let logger = Arc::new(Logger::with_uploader(config, uploader)?);
            *shared = Some(logger.clone());
            Ok(logger)
        }
    }
}

pub fn shared() -> Result<Arc<Logger>> {
    SHARED.lock().unwrap().clone().ok_or(LoggerError::Uninitialized)
}

/// Drops the shared logger so the next `initialize` starts from scratch.
pub fn reset() {
    SHARED.lock().unwrap().take();
}

pub fn log_event(text: &str) -> Result<()> {
    shared()?.log_event(text)
}

pub fn upload_all_files<F>(on_complete: F) -> Result<BatchTicket>
where
    F: FnOnce(BatchOutcome) + Send + 'static,
{
    shared()?.upload_all_files(on_complete)
}
