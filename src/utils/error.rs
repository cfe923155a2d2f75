//! Error handling module
//!
//! Defines the request-level error taxonomy and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clients::trials::TrialError;
use crate::resolver::ResolveError;

/// Application error types
///
/// Every variant here is fatal for the whole request: it replaces the result
/// stream with a single error payload. Per-provider failures are handled
/// inside the resolver and the clients and never reach this type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request-wide configuration resolution failure
    #[error("configuration resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// External trial lookup failure
    #[error("trial lookup failed: {0}")]
    UpstreamLookup(#[from] TrialError),

    /// Prompt rendering failure
    #[error("prompt rendering failed: {0}")]
    Prompt(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Internal server error
    #[error("internal server error: {0}")]
    Internal(String),
}

/// Error response payload returned instead of a result stream
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Resolve(ResolveError::CustomerNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Resolve(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UpstreamLookup(TrialError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::UpstreamLookup(_) => StatusCode::BAD_GATEWAY,
            AppError::Prompt(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Resolve(ResolveError::CustomerNotFound(_)) => "not_found_error",
            AppError::Resolve(_) => "config_error",
            AppError::UpstreamLookup(TrialError::NotFound(_)) => "not_found_error",
            AppError::UpstreamLookup(_) => "upstream_error",
            AppError::Prompt(_) => "invalid_request_error",
            AppError::Config(_) | AppError::Internal(_) => "api_error",
        }
    }
}

/// Implement IntoResponse so fatal errors can be returned directly from handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        tracing::error!("Request failed: {} - status code: {}", self, status);

        let payload = ErrorResponse {
            error_type: self.error_type().to_string(),
            message: self.to_string(),
        };

        (status, Json(payload)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
