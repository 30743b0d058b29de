//! Remote Range Store
//!
//! Boundary to the spreadsheet-backed store the cache fronts. The cache never
//! looks inside rows; it only moves them between this store and callers.

mod http;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use http::{HttpRangeStore, HttpRangeStoreConfig};
pub use memory::InMemoryRangeStore;

/// A single spreadsheet row, cells as loosely typed JSON values.
pub type Row = Vec<serde_json::Value>;

/// The contents of one range.
pub type Rows = Vec<Row>;

// == Range Store Error ==
/// Failures reported by a range store.
#[derive(Error, Debug)]
pub enum RangeStoreError {
    #[error("Unauthorized by upstream store")]
    Unauthorized,

    #[error("Range not found: {0}")]
    NotFound(String),

    #[error("Rate limited by upstream store")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

// == Remote Range Store Trait ==
/// Asynchronous key-range store. Implementations own their timeouts.
#[async_trait]
pub trait RemoteRangeStore: Send + Sync + std::fmt::Debug {
    /// Reads every row in `range`.
    async fn fetch(&self, range: &str) -> Result<Rows, RangeStoreError>;

    /// Replaces the contents of `range` with `rows`.
    async fn write(&self, range: &str, rows: Rows) -> Result<(), RangeStoreError>;

    /// Short name used in logs.
    fn store_name(&self) -> &'static str;
}
