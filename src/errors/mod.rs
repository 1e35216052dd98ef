/// Unified error handling module
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
        };

        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (StatusCode::OK, Json(error_response)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure categories at the outbound fetch boundary. Never escapes the
/// service layer: both variants are converted into normalized error records.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, timeout, or non-2xx response from the upstream API
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    /// Anything else: malformed body, decode failure
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Unexpected(err.to_string())
        } else {
            FetchError::Upstream(err.to_string())
        }
    }
}

/// Type alias for outbound fetch results
pub type FetchResult<T> = Result<T, FetchError>;
