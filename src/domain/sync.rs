use crate::clients::{BitbucketApiClient, GitClient};
use crate::domain::connectors::bitbucket::BitbucketConnector;
use crate::domain::models::{DataSourceContext, SyncJob};
use crate::error::AppResult;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Sync orchestrator for running Bitbucket syncs as background jobs.
pub struct SyncOrchestrator {
    storage: Arc<dyn Storage>,
    api: Arc<BitbucketApiClient>,
    git: Arc<dyn GitClient>,
}

impl SyncOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        api: Arc<BitbucketApiClient>,
        git: Arc<dyn GitClient>,
    ) -> Self {
        Self { storage, api, git }
    }

    /// Start a sync job for a data source (runs in background).
    pub async fn start_sync(&self, context: DataSourceContext) -> AppResult<SyncJob> {
        let job = SyncJob::new(&context);
        self.storage.save_sync_job(job.clone()).await?;

        let storage = Arc::clone(&self.storage);
        let connector = BitbucketConnector::new(
            context,
            Arc::clone(&self.api),
            Arc::clone(&self.git),
        );
        let job_id = job.id;

        tokio::spawn(async move {
            if let Err(e) = Self::execute_sync(storage, connector, job_id).await {
                error!("Sync job {} could not be recorded: {}", job_id, e);
            }
        });

        Ok(job)
    }

    /// Execute the sync operation and record its outcome on the job.
    async fn execute_sync(
        storage: Arc<dyn Storage>,
        connector: BitbucketConnector,
        job_id: Uuid,
    ) -> AppResult<()> {
        info!("Starting sync job {} for '{}'", job_id, connector.context().params.username);
        storage.mark_sync_job_running(job_id).await?;

        match connector.fetch().await {
            Ok(report) => {
                info!(
                    "Sync job {} completed: {} cloned, {} failed, {} skipped",
                    job_id,
                    report.cloned.len(),
                    report.failed.len(),
                    report.skipped.len()
                );
                storage.complete_sync_job(job_id, report).await
            }
            Err(e) => {
                error!("Sync job {} failed: {}", job_id, e);
                storage.fail_sync_job(job_id, e.to_string()).await
            }
        }
    }
}
