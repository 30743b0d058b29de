//! Cache Store Module
//!
//! HashMap-backed entry storage with TTL expiry, hit/miss accounting and
//! key or prefix invalidation.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::entry::is_expired;
use crate::cache::key::validate_prefix;
use crate::cache::{CacheEntry, CacheStats, StatsSnapshot};
use crate::error::Result;

// == Cache Store ==
/// Entry storage keyed by opaque strings.
///
/// There is no capacity bound; memory is reclaimed by lazy eviction on `get`
/// and by `sweep`.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Lifetime hit/miss counters
    stats: CacheStats,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry for `key` is removed. Every call counts exactly one
    /// hit or one miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = Instant::now();

        match self.entries.get(key) {
            Some(entry) if !is_expired(entry, now) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            Some(_) => {
                self.entries.remove(key);
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// `ttl` falls back to the store default when `None`.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key.into(), CacheEntry::new(value, ttl));
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Invalidate By Prefix ==
    /// Removes every key starting with `prefix` (case-sensitive) and returns
    /// how many were removed.
    ///
    /// The prefix must end with the key separator.
    pub fn invalidate_by_prefix(&mut self, prefix: &str) -> Result<usize> {
        validate_prefix(prefix)?;

        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - self.entries.len())
    }

    // == Sweep ==
    /// Removes all expired entries and returns the number removed.
    pub fn sweep(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !is_expired(entry, now));
        before - self.entries.len()
    }

    // == Stats ==
    /// Returns the counters together with the current entry count.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entries.len())
    }

    /// Iterates the keys currently held, expired-but-unswept ones included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
