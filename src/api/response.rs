use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// Standardized API response format.
///
/// # Example Success Response
/// ```json
/// {
///     "success": true,
///     "data": { "connection_type": "BitBucket", "fields": ["username", "token", "target_directory"] }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Create a success HttpResponse with the standard format.
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(data))
}

/// Create a 202 Accepted response with the standard format.
pub fn accepted_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Accepted().json(ApiResponse::success(data))
}
