//! Error types for the catalog service
//!
//! Cache errors stay inside the cache layer; API errors are rendered as JSON
//! responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by the cache store when a key is rejected.
///
/// Callers of the shared cache never see these: a rejected key degrades to
/// uncached behavior.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// Key is the empty string
    #[error("Cache key cannot be empty")]
    EmptyKey,

    /// Key exceeds the maximum length
    #[error("Cache key exceeds maximum length of {0} bytes")]
    KeyTooLong(usize),
}

// == API Error Enum ==
/// Unified error type for HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or wrong admin credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Conflict(msg) => ApiError::Conflict(msg),
            CatalogError::InvalidInput(msg) => ApiError::InvalidRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
