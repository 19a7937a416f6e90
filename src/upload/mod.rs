pub mod http;
pub mod orchestrator;
pub mod progress;
pub mod traits;

pub use http::HttpUploader;
pub use orchestrator::{BatchTicket, UploadOrchestrator};
pub use progress::{BatchOutcome, UploadProgress, UploadProgressSnapshot};
pub use traits::{UploadError, Uploader};
