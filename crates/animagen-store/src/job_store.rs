//! Persisted job records
//!
//! The store is an external system that serializes concurrent writes per
//! record; exactly one orchestrator instance owns a given job, so
//! read-modify-write races on the same id are not a concern. Status polling
//! reads are lock-free from the caller's perspective and never block the
//! retry loop.

use animagen_core::{JobId, JobRecord, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Job record persistence (seam for the external job store)
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or fully replace the record for its id
    async fn upsert(&self, record: &JobRecord) -> Result<()>;

    /// Fetch a record; `None` when the id is unknown
    async fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>>;
}

/// In-memory job store
///
/// Stands in for the external persisted store in tests and single-process
/// deployments.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    records: RwLock<HashMap<JobId, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn upsert(&self, record: &JobRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }
}
