use actix_web::{web, HttpResponse};
use serde::Deserialize;
use crate::api::response::{accepted_response, success_response};
use crate::domain::connectors::bitbucket::{connection_data, load_icon, FALLBACK_ICON};
use crate::domain::models::{DataSourceContext, SyncParameters};
use crate::domain::sync::SyncOrchestrator;
use crate::error::{AppError, AppResult};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub target_directory: Option<String>,
}

/// Connection descriptor for the configuration UI.
/// GET /api/connectors/bitbucket/connection
pub async fn get_connection() -> HttpResponse {
    success_response(connection_data())
}

/// Connector icon.
/// GET /api/connectors/bitbucket/icon
pub async fn get_icon(app_state: web::Data<crate::AppState>) -> HttpResponse {
    let assets_dir = app_state.config.assets_dir.clone();
    let icon = web::block(move || load_icon(&assets_dir))
        .await
        .unwrap_or_else(|_| FALLBACK_ICON.to_string());

    HttpResponse::Ok()
        .content_type("image/svg+xml")
        .body(icon)
}

/// Clone every repository of a Bitbucket user in the background.
/// POST /api/connectors/bitbucket/sync
pub async fn start_sync(
    app_state: web::Data<crate::AppState>,
    body: web::Json<SyncRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let target_directory = body.target_directory
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            app_state.config.default_target_directory
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
        });

    let mut params = SyncParameters::from_config(&serde_json::json!({
        "username": body.username,
        "token": body.token,
        "target_directory": target_directory,
    }))?;

    if let Some(root) = app_state.config.sync_root.clone() {
        let requested = params.target_directory.clone();
        params.target_directory = web::block(move || confine_to_root(&root, &requested))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;
    }

    let mut context = DataSourceContext::new(params);
    if let Some(name) = body.name {
        context = context.with_name(name);
    }

    let orchestrator = SyncOrchestrator::new(
        Arc::clone(&app_state.storage),
        Arc::clone(&app_state.bitbucket_client),
        Arc::clone(&app_state.git_client),
    );

    let job = orchestrator.start_sync(context).await?;
    info!("Queued Bitbucket sync job {} for '{}'", job.id, job.username);

    Ok(accepted_response(job))
}

/// Resolve `requested` (relative paths are taken from `root`) and reject anything outside `root`.
fn confine_to_root(root: &Path, requested: &Path) -> AppResult<PathBuf> {
    let root = root.canonicalize().map_err(|e| {
        AppError::Internal(format!("Sync root '{}' is unusable: {}", root.display(), e))
    })?;

    let joined = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };
    if joined.components().any(|c| matches!(c, Component::ParentDir)) {
        warn!("Rejected sync target '{}' containing '..'", requested.display());
        return Err(AppError::BadRequest(format!(
            "Target directory '{}' must not contain '..'",
            requested.display()
        )));
    }

    // Canonicalize the deepest existing ancestor so symlinks cannot lead out of the root.
    let mut existing = joined.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing.canonicalize().map_err(|e| {
        AppError::BadRequest(format!("Target directory '{}' is invalid: {}", requested.display(), e))
    })?;
    resolved.extend(missing.iter().rev());

    if !resolved.starts_with(&root) {
        warn!("Rejected sync target '{}' outside {}", requested.display(), root.display());
        return Err(AppError::BadRequest(format!(
            "Target directory '{}' is outside the sync root",
            requested.display()
        )));
    }
    Ok(resolved)
}
