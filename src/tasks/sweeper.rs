//! Expiration Sweeper
//!
//! Background task that periodically removes expired entries from one cache.
//!
//! Reads already hide expired entries; the sweep only bounds memory held by
//! entries that are written once and never read again.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStore, CacheValue};

/// Upper bound on the sweep period: 5 minutes
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Sweep period for a cache: its TTL, capped at `ceiling`.
pub fn sweep_interval(ttl_ms: u64, ceiling: Duration) -> Duration {
    Duration::from_millis(ttl_ms.max(1)).min(ceiling)
}

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task keeps only a weak reference to the store and exits on its own
/// once the store is dropped. Callers still abort the returned handle on
/// shutdown so no timer outlives its registry.
///
/// # Arguments
/// * `name` - Cache name, for logging
/// * `cache` - Shared reference to the cache
/// * `interval` - Time between sweeps
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::new("api", CacheConfig::new())));
/// let handle = spawn_sweeper("api".to_string(), &cache, Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweeper<V: CacheValue>(
    name: String,
    cache: &Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> JoinHandle<()> {
    let cache: Weak<RwLock<CacheStore<V>>> = Arc::downgrade(cache);

    tokio::spawn(async move {
        debug!(cache = %name, interval_ms = interval.as_millis() as u64, "Starting expiration sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let Some(cache) = cache.upgrade() else {
                debug!(cache = %name, "Cache dropped, stopping sweeper");
                break;
            };

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired()
            };

            if removed > 0 {
                info!(cache = %name, removed, "Expiration sweep removed entries");
            } else {
                debug!(cache = %name, "Expiration sweep: no expired entries found");
            }
        }
    })
}
