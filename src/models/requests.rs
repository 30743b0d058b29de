//! Request DTOs for the ops API
//!
//! Defines query strings and bodies accepted by the handlers.

use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheKey;
use crate::config::{TtlCategory, TtlPolicy};
use crate::error::Result;
use crate::upstream::Rows;

/// Query string for `GET /ranges/:range`
///
/// # Fields
/// - `key`: cache key to serve the range under (default `range:<range>`)
/// - `ttl_ms`: explicit TTL in milliseconds
/// - `category`: named TTL category, used when `ttl_ms` is absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadQuery {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    #[serde(default)]
    pub category: Option<TtlCategory>,
}

impl ReadQuery {
    /// Cache key for `range`, defaulting to `range:<range>`.
    pub fn cache_key(&self, range: &str) -> Result<CacheKey> {
        match &self.key {
            Some(key) => key.parse(),
            None => CacheKey::for_range(range),
        }
    }

    /// Resolves the TTL: explicit milliseconds, then category, then `None`
    /// (store default).
    pub fn ttl(&self, policy: &TtlPolicy) -> Option<Duration> {
        match (self.ttl_ms, self.category) {
            (Some(ms), _) => Some(Duration::from_millis(ms)),
            (None, Some(category)) => Some(policy.ttl_for(category)),
            (None, None) => None,
        }
    }

}

/// Request body for `PUT /ranges/:range`
#[derive(Debug, Clone, Deserialize)]
pub struct WriteRequest {
    /// Rows replacing the range contents
    pub rows: Rows,
    /// Cache key to drop once the write succeeds
    #[serde(default)]
    pub invalidate: Option<String>,
}

impl WriteRequest {
    /// The key to drop after the write, if one was named.
    pub fn invalidate_key(&self) -> Result<Option<CacheKey>> {
        self.invalidate.as_deref().map(str::parse).transpose()
    }
}

/// Query string for `DELETE /cache`
///
/// Exactly one of `prefix` or `all=true` must be given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub all: bool,
}
