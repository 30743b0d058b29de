//! Cache Module
//!
//! In-process read-through cache with TTL expiry, prefix invalidation and
//! single-flight deduplication of upstream fetches.

mod entry;
mod flight;
mod key;
mod read_through;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{is_expired, CacheEntry};
pub use flight::{FlightRegistry, FlightResult, SharedFetch};
pub use key::{validate_prefix, CacheKey, KEY_SEPARATOR};
pub use read_through::ReadThroughCache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
