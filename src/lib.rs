//! Daily event log files with a retention window and batch upload to a remote bucket.
//!
//! Events are appended to one file per calendar day inside a configured folder.
//! When the day rolls over, files older than the retention window are deleted.
//! Every retained file can be shipped to an object store as a single batch whose
//! aggregate outcome is reported once.

pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod global;
pub mod logger;
pub mod retention;
pub mod upload;
pub mod writer;

pub use config::Config;
pub use error::{LoggerError, Result};
pub use logger::Logger;
