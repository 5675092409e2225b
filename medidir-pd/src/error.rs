//! Error types for the profile directory API

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assets::AssetError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Submission failed field validation (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Write attempted against an already existing key (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Declared photo type is not an accepted image format (415)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Photo payload exceeds the size limit (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Malformed multipart submission (400)
    #[error("Malformed submission: {0}")]
    Multipart(#[from] MultipartError),

    /// IO error (500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// medidir-common error (500)
    #[error("Store error: {0}")]
    Common(#[from] medidir_common::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Upsert-only writes cannot conflict, but the schema still rejects a
        // raw insert against an existing name; surface that as 409.
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ApiError::Conflict("profile name already exists".to_string());
            }
        }
        ApiError::Database(err)
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        let message = err.to_string();
        match err {
            AssetError::UnsupportedMediaType(_) => ApiError::UnsupportedMediaType(message),
            AssetError::TooLarge { .. } => ApiError::PayloadTooLarge(message),
            AssetError::Io(e) => ApiError::Io(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Io(_) | ApiError::Database(_) | ApiError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
