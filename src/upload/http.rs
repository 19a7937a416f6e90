use super::traits::{UploadError, Uploader};
use crate::config::RemoteConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Uploads log files with a plain HTTP `PUT {endpoint}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    remote: Option<RemoteConfig>,
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new(remote: Option<RemoteConfig>) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { remote, client })
    }

    pub fn object_url(remote: &RemoteConfig, remote_key: &str) -> String {
        format!(
            "{}/{}/{}",
            remote.endpoint.trim_end_matches('/'),
            remote.bucket.trim_matches('/'),
            remote_key.trim_start_matches('/')
        )
    }

    fn usable_remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref().filter(|r| r.is_complete())
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    fn is_configured(&self) -> bool {
        self.usable_remote().is_some()
    }

    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<(), UploadError> {
        let remote = self.usable_remote().ok_or(UploadError::NotConfigured)?;

        let body = tokio::fs::read(local_path)
            .await
            .map_err(|e| UploadError::Io {
                path: local_path.to_path_buf(),
                source: e,
            })?;
        let checksum = format!("{:x}", Sha256::digest(&body));

        let url = Self::object_url(remote, remote_key);
        tracing::debug!(url = %url, bytes = body.len(), "Uploading log file");

        let response = self
            .client
            .put(&url)
            .basic_auth(&remote.access_key, Some(&remote.secret_key))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header("x-amz-content-sha256", checksum)
            .header("x-amz-region", &remote.region)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::Status {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
