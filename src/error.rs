use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;

use crate::core::ResolveError;
use crate::models::ErrorResponse;
use crate::report::ReportError;
use crate::services::{ExtractionError, PlatformError};

/// Errors surfaced by the HTTP layer, rendered as `{"error": message}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("File too large. Maximum size is {} MB", .max_bytes / (1024 * 1024))]
    PayloadTooLarge { max_bytes: usize },

    #[error("Request body too large. Maximum size is {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to reach GitHub: {0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } | ApiError::BodyTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl From<PlatformError> for ApiError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound(username) => {
                ApiError::NotFound(format!("GitHub user not found: {}", username))
            }
            PlatformError::Network(e) => ApiError::Upstream(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Render malformed JSON bodies in the same shape as every other error
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    match err {
        error::JsonPayloadError::Overflow { limit }
        | error::JsonPayloadError::OverflowKnownLength { limit, .. } => {
            ApiError::BodyTooLarge { limit }.into()
        }
        other => ApiError::InvalidFormat(format!("Invalid JSON: {}", other)).into(),
    }
}
