use crate::domain::models::{SyncJob, SyncReport, SyncStatus};
use crate::error::{AppError, AppResult};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

const DEFAULT_FINISHED_JOB_RETENTION: usize = 500;

/// In-memory storage implementation.
pub struct InMemoryStorage {
    sync_jobs: RwLock<HashMap<Uuid, SyncJob>>,
    /// Completed and failed jobs kept before the oldest are dropped
    max_finished_jobs: usize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_FINISHED_JOB_RETENTION)
    }

    pub fn with_retention(max_finished_jobs: usize) -> Self {
        Self {
            sync_jobs: RwLock::new(HashMap::new()),
            max_finished_jobs,
        }
    }

    /// Drop the oldest finished jobs beyond the retention limit. Pending and running jobs stay.
    fn prune_finished(&self, jobs: &mut HashMap<Uuid, SyncJob>) {
        let mut finished: Vec<(DateTime<Utc>, Uuid)> = jobs.values()
            .filter(|job| matches!(job.status, SyncStatus::Completed | SyncStatus::Failed))
            .map(|job| (job.completed_at.unwrap_or(job.started_at), job.id))
            .collect();
        if finished.len() <= self.max_finished_jobs {
            return;
        }

        finished.sort();
        let excess = finished.len() - self.max_finished_jobs;
        for (_, id) in finished.into_iter().take(excess) {
            jobs.remove(&id);
        }
    }

    fn update_job(&self, id: Uuid, apply: impl FnOnce(&mut SyncJob)) -> AppResult<()> {
        let mut jobs = self.sync_jobs.write()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        let job = jobs.get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Sync job {} not found", id)))?;
        apply(job);
        self.prune_finished(&mut jobs);
        Ok(())
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_sync_job(&self, job: SyncJob) -> AppResult<SyncJob> {
        let mut jobs = self.sync_jobs.write()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get_sync_job(&self, id: Uuid) -> AppResult<Option<SyncJob>> {
        let jobs = self.sync_jobs.read()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        Ok(jobs.get(&id).cloned())
    }

    async fn list_sync_jobs(&self) -> AppResult<Vec<SyncJob>> {
        let jobs = self.sync_jobs.read()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        let mut list: Vec<SyncJob> = jobs.values().cloned().collect();
        list.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(list)
    }

    async fn mark_sync_job_running(&self, id: Uuid) -> AppResult<()> {
        self.update_job(id, |job| job.status = SyncStatus::Running)
    }

    async fn complete_sync_job(&self, id: Uuid, report: SyncReport) -> AppResult<()> {
        self.update_job(id, |job| {
            job.status = SyncStatus::Completed;
            job.report = Some(report);
            job.completed_at = Some(Utc::now());
        })
    }

    async fn fail_sync_job(&self, id: Uuid, error: String) -> AppResult<()> {
        self.update_job(id, |job| {
            job.status = SyncStatus::Failed;
            job.error = Some(error);
            job.completed_at = Some(Utc::now());
        })
    }
}
