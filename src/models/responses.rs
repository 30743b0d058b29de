//! Response DTOs for the ops API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::sync::Arc;

use serde::Serialize;

use crate::upstream::Rows;

/// Response body for `GET /ranges/:range`
#[derive(Debug, Clone, Serialize)]
pub struct RowsResponse {
    pub range: String,
    /// Cache key the rows are held under
    pub key: String,
    pub rows: Arc<Rows>,
}

impl RowsResponse {
    pub fn new(range: impl Into<String>, key: impl Into<String>, rows: Arc<Rows>) -> Self {
        Self {
            range: range.into(),
            key: key.into(),
            rows,
        }
    }
}

/// Response body for `PUT /ranges/:range`
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse {
    /// Success message
    pub message: String,
    pub range: String,
    /// Cache key that was invalidated, if any
    pub invalidated: Option<String>,
}

impl WriteResponse {
    pub fn new(range: impl Into<String>, invalidated: Option<String>) -> Self {
        let range = range.into();
        Self {
            message: format!("Range '{}' written successfully", range),
            range,
            invalidated,
        }
    }
}

/// Response body for `DELETE /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub key: String,
    /// Whether an entry was actually removed
    pub removed: bool,
}

impl InvalidateResponse {
    pub fn new(key: impl Into<String>, removed: bool) -> Self {
        Self {
            key: key.into(),
            removed,
        }
    }
}

/// Response body for `DELETE /cache?prefix=`
#[derive(Debug, Clone, Serialize)]
pub struct PrefixInvalidateResponse {
    pub prefix: String,
    /// Number of entries removed
    pub removed: usize,
}

impl PrefixInvalidateResponse {
    pub fn new(prefix: impl Into<String>, removed: usize) -> Self {
        Self {
            prefix: prefix.into(),
            removed,
        }
    }
}

/// Response body for `DELETE /cache?all=true`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
