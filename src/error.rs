//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror. Misses and expiry are not
//! errors; only upstream failures and bad requests surface here.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::RangeStoreError;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
///
/// `Clone` because one failed fetch is delivered to every caller waiting on it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The remote range store rejected a fetch or write
    #[error("Upstream error: {0}")]
    Upstream(Arc<RangeStoreError>),

    /// Invalid request data (bad key, bad prefix, bad TTL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error, e.g. a fetch task that panicked
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RangeStoreError> for CacheError {
    fn from(err: RangeStoreError) -> Self {
        CacheError::Upstream(Arc::new(err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Upstream(err) => match err.as_ref() {
                RangeStoreError::NotFound(_) => StatusCode::NOT_FOUND,
                RangeStoreError::RateLimited => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
