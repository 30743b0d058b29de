//! Cache Statistics Module
//!
//! Tracks hit and miss counters for the lifetime of the store.

use serde::Serialize;

// == Cache Stats ==
/// Monotonic lookup counters. There is no reset; a fresh store starts at zero.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Hit rate rendered as a percentage with two decimals, e.g. `"60.00%"`.
    pub fn hit_rate_percent(&self) -> String {
        format!("{:.2}%", self.hit_rate() * 100.0)
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Snapshot ==
    /// Freezes the counters together with the current store size.
    pub fn snapshot(&self, size: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            size,
            hit_rate: self.hit_rate_percent(),
        }
    }
}

/// Point-in-time view returned by `get_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently held, expired-but-unswept ones included
    pub size: usize,
    #[serde(rename = "hitRate")]
    pub hit_rate: String,
}
