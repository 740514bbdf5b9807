//! Key-addressed blob storage for rendered artifacts

use animagen_core::{AnimagenError, Result, StorageConfig};
use async_trait::async_trait;
use std::path::Path;

/// Blob upload seam: store the file under `key`, return its public address
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn upload(&self, key: &str, path: &Path) -> Result<String>;
}

/// HTTP bucket store
///
/// Uploads to `{upload_base}/{bucket}/{key}` with bearer auth and resolves
/// the public address as `{public_base}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpBucketStore {
    http: reqwest::Client,
    upload_base: String,
    public_base: String,
    bucket: String,
    api_key: String,
}

impl HttpBucketStore {
    pub fn new(config: &StorageConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
            public_base: config.public_base.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            api_key: api_key.into(),
        }
    }

    /// Public address an uploaded key resolves to
    fn public_address(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, key)
    }
}

#[async_trait]
impl ArtifactStore for HttpBucketStore {
    async fn upload(&self, key: &str, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;

        let url = format!("{}/{}/{}", self.upload_base, self.bucket, key);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("cache-control", "3600")
            .header("content-type", "video/mp4")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AnimagenError::Upload(format!("Failed to send upload: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(AnimagenError::Upload(format!(
                "Storage backend rejected write {}: {}",
                status, error_text
            )));
        }

        Ok(self.public_address(key))
    }
}
