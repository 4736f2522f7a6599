//! The persistence collaborator seam, plus two ready-made stores.
//!
//! The orchestrator calls [`JobStore::save`] after every stage transition
//! so partial progress survives a crash. Saves must be idempotent: the
//! record is keyed by job id and each save simply replaces the previous
//! snapshot, so retrying a save is always harmless.

use crate::error::StoreError;
use crate::job::DocumentJob;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Persists job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Durably record the current state of `job`. Idempotent under retry.
    async fn save(&self, job: &DocumentJob) -> Result<(), StoreError>;
}

/// Writes each job as `{id}.json` under a directory.
///
/// Uses the write-to-temp-then-rename pattern so readers never observe a
/// partially written record.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record for `id`.
    pub fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Read a record back, mostly for recovery and tests.
    pub async fn load(&self, id: Uuid) -> Result<DocumentJob, StoreError> {
        let bytes = tokio::fs::read(self.record_path(id))
            .await
            .map_err(|source| StoreError::Io { source })?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialize(e.to_string()))
    }
}

#[async_trait]
impl JobStore for JsonFileStore {
    async fn save(&self, job: &DocumentJob) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(job).map_err(|e| StoreError::Serialize(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io { source })?;

        let path = self.record_path(job.id);
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|source| StoreError::Io { source })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| StoreError::Io { source })?;

        debug!(job_id = %job.id, path = %path.display(), "job record saved");
        Ok(())
    }
}

/// Keeps the latest snapshot of each job in memory.
///
/// Useful for tests and for hosts that persist elsewhere and only need the
/// pipeline's save calls observable.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    jobs: Mutex<HashMap<Uuid, DocumentJob>>,
    saves: Mutex<Vec<Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest saved snapshot for `id`, if any.
    pub async fn get(&self, id: Uuid) -> Option<DocumentJob> {
        self.jobs.lock().await.get(&id).cloned()
    }

    /// How many saves have been recorded, across all jobs.
    pub async fn save_count(&self) -> usize {
        self.saves.lock().await.len()
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn save(&self, job: &DocumentJob) -> Result<(), StoreError> {
        self.jobs.lock().await.insert(job.id, job.clone());
        self.saves.lock().await.push(job.id);
        Ok(())
    }
}
