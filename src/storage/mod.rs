pub mod memory;

use crate::domain::models::{SyncJob, SyncReport};
use crate::error::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage trait for sync job bookkeeping.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_sync_job(&self, job: SyncJob) -> AppResult<SyncJob>;
    async fn get_sync_job(&self, id: Uuid) -> AppResult<Option<SyncJob>>;
    /// All jobs, most recently started first.
    async fn list_sync_jobs(&self) -> AppResult<Vec<SyncJob>>;
    async fn mark_sync_job_running(&self, id: Uuid) -> AppResult<()>;
    async fn complete_sync_job(&self, id: Uuid, report: SyncReport) -> AppResult<()>;
    async fn fail_sync_job(&self, id: Uuid, error: String) -> AppResult<()>;
}
