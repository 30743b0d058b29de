//! In-memory range store, used when no upstream is configured and in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RangeStoreError, RemoteRangeStore, Rows};

#[derive(Debug, Default)]
pub struct InMemoryRangeStore {
    ranges: RwLock<HashMap<String, Rows>>,
    latency: Option<Duration>,
    fetches: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryRangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with initial ranges.
    pub fn with_ranges<I, K>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (K, Rows)>,
        K: Into<String>,
    {
        Self {
            ranges: RwLock::new(ranges.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            ..Self::default()
        }
    }

    /// Delays every fetch and write, to imitate a slow upstream.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of writes accepted so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteRangeStore for InMemoryRangeStore {
    async fn fetch(&self, range: &str) -> Result<Rows, RangeStoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        self.ranges
            .read()
            .await
            .get(range)
            .cloned()
            .ok_or_else(|| RangeStoreError::NotFound(range.to_string()))
    }

    async fn write(&self, range: &str, rows: Rows) -> Result<(), RangeStoreError> {
        self.simulate_latency().await;

        self.ranges.write().await.insert(range.to_string(), rows);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "in-memory"
    }
}
