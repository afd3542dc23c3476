use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a Bitbucket sync before or during repository listing.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("failed to create directory '{}': {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("user '{0}' not found on Bitbucket")]
    UserNotFound(String),

    #[error("access forbidden, check your token or permissions")]
    PermissionDenied,

    #[error("failed to fetch repositories: HTTP {status}")]
    TransportFailure { status: u16 },

    #[error("invalid Bitbucket API URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("request to Bitbucket failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A single failed clone. Never aborts a sync.
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("git exited with {}: {stderr}", exit_label(.code))]
    Exit { code: Option<i32>, stderr: String },

    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Application error types.
#[derive(Debug)]
pub enum AppError {
    /// Bad request with message
    BadRequest(String),
    /// Forbidden access
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Internal server error
    Internal(String),
    /// External service error
    ExternalService(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Error: {}", msg),
            AppError::ExternalService(msg) => write!(f, "External Service Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_type) = match self {
            AppError::BadRequest(_) => (actix_web::http::StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Forbidden(_) => (actix_web::http::StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound(_) => (actix_web::http::StatusCode::NOT_FOUND, "not_found"),
            AppError::Internal(_) => (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::ExternalService(_) => (actix_web::http::StatusCode::BAD_GATEWAY, "external_service_error"),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_type,
            "message": self.to_string()
        }))
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::MissingParameter(_) | SyncError::NotADirectory(_) => {
                AppError::BadRequest(err.to_string())
            }
            SyncError::UserNotFound(_) => AppError::NotFound(err.to_string()),
            SyncError::PermissionDenied => AppError::Forbidden(err.to_string()),
            SyncError::TransportFailure { .. } | SyncError::Http(_) => {
                AppError::ExternalService(err.to_string())
            }
            SyncError::DirectoryCreation { .. } | SyncError::InvalidBaseUrl(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
pub type SyncResult<T> = Result<T, SyncError>;
