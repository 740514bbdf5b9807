//! Artifact publication: upload, resolve address, clean up the local copy

use crate::artifact_store::ArtifactStore;
use animagen_core::{JobId, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Publishes finished artifacts to the storage backend
///
/// The local temporary copy is deleted on every exit path — a failed upload
/// must not accumulate orphaned files.
#[derive(Clone)]
pub struct ArtifactPublisher {
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactPublisher {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Upload the artifact under a key derived from the job id and return
    /// its public address
    pub async fn publish(&self, artifact_path: &Path, job_id: &JobId) -> Result<String> {
        let key = format!("{}.mp4", job_id);
        let result = self.store.upload(&key, artifact_path).await;

        // Cleanup regardless of upload outcome
        if let Err(e) = tokio::fs::remove_file(artifact_path).await {
            warn!(
                "Could not remove temporary artifact {:?}: {}",
                artifact_path, e
            );
        }

        let url = result?;
        info!("Published artifact for job {}: {}", job_id, url);
        Ok(url)
    }
}
