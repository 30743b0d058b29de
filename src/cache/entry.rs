//! Cache Entry Module
//!
//! Defines individual cache entries and the single expiry predicate shared by
//! lazy eviction on read and the periodic sweep.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A cached value with its creation and absolute expiry instants.
///
/// Entries are never mutated after creation; a refresh replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was written
    pub created_at: Instant,
    /// When the entry stops being served
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that lives for `ttl` starting now.
    ///
    /// A zero TTL is accepted and produces an entry that is stale as soon as
    /// any time passes.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self::with_created_at(value, Instant::now(), ttl)
    }

    /// Creates an entry with an explicit creation instant.
    pub fn with_created_at(value: V, created_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            expires_at: created_at + ttl,
        }
    }
}

/// Expiry rule used by both `CacheStore::get` and `CacheStore::sweep`.
///
/// An entry is valid while `now <= expires_at`; it is expired strictly after.
pub fn is_expired<V>(entry: &CacheEntry<V>, now: Instant) -> bool {
    now > entry.expires_at
}
