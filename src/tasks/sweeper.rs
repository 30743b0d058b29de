//! Expiry Sweeper
//!
//! Background task that periodically evicts expired cache entries. Lookups
//! only evict the key they read, so entries written once and never read again
//! would otherwise stay in memory indefinitely.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ReadThroughCache;

/// Spawns a task that sweeps `cache` every `interval`.
///
/// The first sweep happens one full interval after spawning. The returned
/// handle can be aborted during shutdown.
///
/// # Example
/// ```ignore
/// let cache = ReadThroughCache::<String>::new(Duration::from_secs(120));
/// let sweeper = spawn_sweeper_task(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper_task<V>(cache: ReadThroughCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Starting expiry sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep().await;

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
