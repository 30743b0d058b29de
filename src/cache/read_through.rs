//! Read-Through Cache
//!
//! Combines the entry store and the in-flight registry behind one lock so that
//! "cache miss, no pending fetch, register a fetch" happens as a single step.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::flight::{FlightRegistry, SharedFetch};
use crate::cache::{CacheStore, StatsSnapshot};
use crate::error::{CacheError, Result};

#[derive(Debug)]
struct CacheState<V> {
    store: CacheStore<V>,
    flights: FlightRegistry<V>,
}

// == Read-Through Cache ==
/// Shared handle to the process-wide cache.
///
/// Cloning is cheap; every clone sees the same entries, counters and pending
/// fetches. Construct one at startup and hand clones to every call site.
#[derive(Debug)]
pub struct ReadThroughCache<V> {
    state: Arc<RwLock<CacheState<V>>>,
}

impl<V> Clone for ReadThroughCache<V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<V> ReadThroughCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState {
                store: CacheStore::new(default_ttl),
                flights: FlightRegistry::new(),
            })),
        }
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `fetcher` to load it.
    ///
    /// At most one fetch per key is registered at a time; callers arriving
    /// while it runs await the same outcome. A successful result is cached
    /// with `ttl` (store default when `None`). A failure is returned to every
    /// waiter, nothing is cached, and the next call fetches again.
    ///
    /// The fetch runs on its own task, so it completes and populates the
    /// cache even if every caller stops waiting. No timeout is applied here.
    ///
    /// [`invalidate`](Self::invalidate) detaches a pending fetch: its waiters
    /// still get its result but it is not cached, and the next call starts a
    /// new fetch, so two fetcher calls for one key can briefly overlap.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>> + Send + 'static,
        E: Into<CacheError> + Send + 'static,
    {
        let fetch = {
            let mut state = self.state.write().await;

            if let Some(value) = state.store.get(key) {
                debug!(key, "cache hit");
                return Ok(value);
            }

            match state.flights.join(key) {
                Some(fetch) => {
                    debug!(key, "joining in-flight fetch");
                    fetch
                }
                None => {
                    let id = state.flights.next_id();
                    let fetch = self.flight(key.to_string(), id, fetcher(), ttl);
                    state.flights.insert(key, id, fetch.clone());
                    debug!(key, flight = id, "cache miss, fetching");

                    tokio::spawn(fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Wraps one upstream call with the bookkeeping that must happen before
    /// any waiter sees its result: populate on success, deregister always.
    fn flight<Fut, E>(
        &self,
        key: String,
        id: u64,
        fetch: Fut,
        ttl: Option<Duration>,
    ) -> SharedFetch<V>
    where
        Fut: Future<Output = std::result::Result<V, E>> + Send + 'static,
        E: Into<CacheError> + Send + 'static,
    {
        let shared = Arc::clone(&self.state);

        async move {
            let result = match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(CacheError::Internal(format!(
                    "fetch for '{}' panicked",
                    key
                ))),
            };

            let mut state = shared.write().await;
            let owned = state.flights.complete(&key, id);

            match &result {
                Ok(value) if owned => state.store.set(key.clone(), value.clone(), ttl),
                Ok(_) => debug!(key = %key, flight = id, "fetch finished after invalidation, not cached"),
                Err(err) => warn!(key = %key, flight = id, error = %err, "fetch failed"),
            }

            result
        }
        .boxed()
        .shared()
    }

    // == Point Operations ==
    /// Looks up `key`, counting a hit or a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.state.write().await.store.get(key)
    }

    /// Writes `value` directly, replacing any entry for `key`.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.state.write().await.store.set(key, value, ttl);
    }

    // == Invalidate ==
    /// Drops the entry for `key` and detaches any fetch pending for it, so the
    /// next read goes upstream. Returns whether an entry was removed.
    pub async fn invalidate(&self, key: &str) -> bool {
        let mut state = self.state.write().await;
        let removed = state.store.delete(key);
        let detached = state.flights.detach(key);

        debug!(key, removed, detached, "invalidated key");
        removed
    }

    /// Drops every entry whose key starts with `prefix` and detaches matching
    /// pending fetches. The prefix must end with the key separator.
    pub async fn invalidate_by_prefix(&self, prefix: &str) -> Result<usize> {
        let mut state = self.state.write().await;
        let removed = state.store.invalidate_by_prefix(prefix)?;
        let detached = state.flights.detach_prefix(prefix);

        info!(prefix, removed, detached, "invalidated prefix");
        Ok(removed)
    }

    /// Drops every entry. Pending fetches are left running and will still
    /// populate the cache when they finish.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let removed = state.store.len();
        state.store.clear();

        info!(removed, "cache cleared");
    }

    /// Evicts expired entries and returns how many were removed.
    pub async fn sweep(&self) -> usize {
        self.state.write().await.store.sweep()
    }

    // == Stats ==
    pub async fn stats(&self) -> StatsSnapshot {
        self.state.read().await.store.stats()
    }

    /// Number of fetches currently registered.
    pub async fn in_flight(&self) -> usize {
        self.state.read().await.flights.len()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.store.is_empty()
    }
}
