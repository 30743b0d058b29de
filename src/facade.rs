//! Data Access Facade
//!
//! The read/write entry point used by every dashboard module. Reads go through
//! the cache with single-flight protection; writes go straight upstream and
//! then drop the affected cache key.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{CacheKey, ReadThroughCache, StatsSnapshot};
use crate::config::{Config, TtlCategory, TtlPolicy};
use crate::error::Result;
use crate::upstream::{RemoteRangeStore, Rows};

// == Data Access ==
/// Cache-fronted access to a [`RemoteRangeStore`].
///
/// Cached rows are shared as `Arc<Rows>`, so hits never copy row data.
#[derive(Debug, Clone)]
pub struct DataAccess {
    cache: ReadThroughCache<Arc<Rows>>,
    store: Arc<dyn RemoteRangeStore>,
    ttl: TtlPolicy,
}

impl DataAccess {
    pub fn new(store: Arc<dyn RemoteRangeStore>, ttl: TtlPolicy) -> Self {
        Self {
            cache: ReadThroughCache::new(ttl.default_ttl()),
            store,
            ttl,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn RemoteRangeStore>) -> Self {
        Self::new(store, config.ttl.clone())
    }

    /// The underlying cache handle, e.g. for the sweeper.
    pub fn cache(&self) -> &ReadThroughCache<Arc<Rows>> {
        &self.cache
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    // == Read Through ==
    /// Returns the rows of `range`, served from `cache_key` when fresh.
    ///
    /// `ttl` falls back to the default TTL when `None`.
    pub async fn read_through(
        &self,
        range: &str,
        cache_key: &CacheKey,
        ttl: Option<Duration>,
    ) -> Result<Arc<Rows>> {
        let store = Arc::clone(&self.store);
        let range = range.to_string();

        self.cache
            .get_or_fetch(
                &cache_key.to_string(),
                move || async move {
                    debug!(range = %range, store = store.store_name(), "fetching range");
                    store.fetch(&range).await.map(Arc::new)
                },
                ttl,
            )
            .await
    }

    /// [`read_through`](Self::read_through) with the TTL of a named category.
    pub async fn read_category(
        &self,
        range: &str,
        cache_key: &CacheKey,
        category: TtlCategory,
    ) -> Result<Arc<Rows>> {
        self.read_through(range, cache_key, Some(self.ttl.ttl_for(category)))
            .await
    }

    // == Write Through ==
    /// Writes `rows` to `range`, then invalidates `invalidate` if given.
    ///
    /// A failed write returns the error and leaves the cache untouched.
    pub async fn write_through(
        &self,
        range: &str,
        rows: Rows,
        invalidate: Option<&CacheKey>,
    ) -> Result<()> {
        self.store.write(range, rows).await?;

        if let Some(key) = invalidate {
            let removed = self.invalidate(key).await;
            info!(range, key = %key, removed, "range written, cache key invalidated");
        } else {
            info!(range, "range written");
        }

        Ok(())
    }

    // == Invalidation ==
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.cache.invalidate(&key.to_string()).await
    }

    pub async fn invalidate_by_prefix(&self, prefix: &str) -> Result<usize> {
        self.cache.invalidate_by_prefix(prefix).await
    }

    /// Drops every key in `domain`, e.g. all `pex:*` entries.
    pub async fn invalidate_domain(&self, domain: &str) -> Result<usize> {
        self.invalidate_by_prefix(&CacheKey::domain_prefix(domain))
            .await
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    // == Stats ==
    pub async fn get_stats(&self) -> StatsSnapshot {
        self.cache.stats().await
    }
}
