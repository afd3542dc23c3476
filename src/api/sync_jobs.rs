use actix_web::{web, HttpResponse};
use crate::api::response::success_response;
use crate::error::{AppError, AppResult};
use uuid::Uuid;

/// List sync jobs, newest first.
/// GET /api/sync/jobs
pub async fn list_jobs(app_state: web::Data<crate::AppState>) -> AppResult<HttpResponse> {
    let jobs = app_state.storage.list_sync_jobs().await?;
    Ok(success_response(jobs))
}

/// GET /api/sync/jobs/{id}
pub async fn get_job(
    app_state: web::Data<crate::AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let job_id = path.into_inner();
    let job = app_state.storage.get_sync_job(job_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Sync job {} not found", job_id)))?;
    Ok(success_response(job))
}
