//! Cache Registry
//!
//! Process-wide table of named caches. One registry is built at startup and
//! handed to every component that caches something; each named cache has its
//! own configuration, lock, sweeper and statistics.

mod single_flight;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, CacheStats, CacheStore, CacheValue};
use crate::config::RegistryConfig;
use crate::error::{CacheError, Result};
use crate::persistence::{FileBackend, PersistenceAdapter};
use crate::tasks::{spawn_sweeper, sweep_interval, MAX_SWEEP_INTERVAL};

pub use single_flight::{FlightGuard, SingleFlight};

/// Shared handle to one named cache.
pub type SharedStore<V> = Arc<RwLock<CacheStore<V>>>;

// == On Existing ==
/// What `create_cache_with` does with the entries of a cache it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnExisting {
    /// Discard them, including the durable mirror
    #[default]
    Drop,
    /// Move them into the new cache, subject to its capacity and TTL
    Preserve,
}

struct RegisteredCache<V: CacheValue> {
    store: SharedStore<V>,
    sweeper: JoinHandle<()>,
}

// == Cache Registry ==
/// Registry of named caches holding values of type `V`.
///
/// Use `serde_json::Value` (the default) when one registry must hold
/// differently shaped values.
pub struct CacheRegistry<V: CacheValue = serde_json::Value> {
    caches: RwLock<HashMap<String, RegisteredCache<V>>>,
    persistence: Option<PersistenceAdapter>,
    flights: SingleFlight,
    compute_timeout: Option<Duration>,
    max_sweep_interval: Duration,
}

impl<V: CacheValue> CacheRegistry<V> {
    // == Constructor ==
    /// Creates an empty registry without persistence and with a 30 second
    /// compute timeout.
    pub fn new() -> Self {
        let defaults = RegistryConfig::default();
        Self {
            caches: RwLock::new(HashMap::new()),
            persistence: None,
            flights: SingleFlight::new(),
            compute_timeout: Some(defaults.compute_timeout()),
            max_sweep_interval: MAX_SWEEP_INTERVAL,
        }
    }

    /// Creates a registry from process configuration.
    ///
    /// A configured persistence directory is created if missing.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::new()
            .with_compute_timeout(Some(config.compute_timeout()))
            .with_max_sweep_interval(config.max_sweep_interval());

        if let Some(dir) = &config.persist_dir {
            let backend = FileBackend::open(dir)?;
            info!(dir = %dir.display(), "Persisting caches to disk");
            registry = registry.with_persistence(PersistenceAdapter::new(Arc::new(backend)));
        }
        Ok(registry)
    }

    /// Sets the backend used by caches created with `persistent`.
    pub fn with_persistence(mut self, adapter: PersistenceAdapter) -> Self {
        self.persistence = Some(adapter);
        self
    }

    /// Sets the get_or_set deadline; None waits indefinitely.
    pub fn with_compute_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.compute_timeout = timeout;
        self
    }

    /// Caps the expiration sweep period.
    pub fn with_max_sweep_interval(mut self, interval: Duration) -> Self {
        self.max_sweep_interval = interval.max(Duration::from_millis(1));
        self
    }

    // == Create Cache ==
    /// Registers a cache, replacing and emptying any cache with the same name.
    pub async fn create_cache(&self, name: impl Into<String>, config: CacheConfig<V>) {
        self.create_cache_with(name, config, OnExisting::Drop).await
    }

    /// Registers a cache, choosing what happens to an existing cache's entries.
    ///
    /// A persistent cache loads its durable mirror here.
    pub async fn create_cache_with(
        &self,
        name: impl Into<String>,
        config: CacheConfig<V>,
        on_existing: OnExisting,
    ) {
        let name = name.into();
        let interval = sweep_interval(config.ttl_ms, self.max_sweep_interval);
        let summary = format!(
            "ttl_ms={} max_entries={} policy={} persistent={} compress={}",
            config.ttl_ms, config.max_entries, config.policy, config.persistent, config.compress
        );

        let mut caches = self.caches.write().await;
        let mut carried = Vec::new();
        if let Some(previous) = caches.remove(&name) {
            previous.sweeper.abort();
            match on_existing {
                OnExisting::Preserve => {
                    carried = previous.store.write().await.take_entries();
                    info!(cache = %name, carried = carried.len(), "Replacing cache, keeping entries");
                }
                OnExisting::Drop => {
                    if let Some(adapter) = &self.persistence {
                        if let Err(e) = adapter.clear(&name) {
                            warn!(cache = %name, error = %e, "Failed to clear persisted cache");
                        }
                    }
                    info!(cache = %name, "Replacing cache, dropping entries");
                }
            }
        }

        let mut store = CacheStore::open(name.clone(), config, self.persistence.clone());
        if !carried.is_empty() {
            store.restore(carried);
            store.flush();
        }

        let store = Arc::new(RwLock::new(store));
        let sweeper = spawn_sweeper(name.clone(), &store, interval);
        caches.insert(name.clone(), RegisteredCache { store, sweeper });

        info!(cache = %name, config = %summary, "Created cache");
    }

    // == Remove Cache ==
    /// Unregisters a cache, stopping its sweeper and flushing its mirror.
    ///
    /// # Returns
    /// true if a cache with that name existed.
    pub async fn remove_cache(&self, name: &str) -> bool {
        let Some(cache) = self.caches.write().await.remove(name) else {
            return false;
        };
        shutdown(name, cache).await;
        true
    }

    // == Lookup ==
    /// Returns the shared store for `name`.
    pub async fn store(&self, name: &str) -> Option<SharedStore<V>> {
        self.caches.read().await.get(name).map(|cache| cache.store.clone())
    }

    pub async fn contains_cache(&self, name: &str) -> bool {
        self.caches.read().await.contains_key(name)
    }

    /// Names of all registered caches, sorted.
    pub async fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    // == Get ==
    /// Reads `key` from cache `name`.
    pub async fn get(&self, name: &str, key: &str) -> Option<V> {
        let store = self.lookup(name).await?;
        let value = store.write().await.get(key);
        value
    }

    // == Set ==
    /// Writes `key` into cache `name`.
    ///
    /// # Returns
    /// false if the cache is unknown or the value was rejected.
    pub async fn set(&self, name: &str, key: &str, value: V, ttl_override_ms: Option<u64>) -> bool {
        let Some(store) = self.lookup(name).await else {
            return false;
        };
        let stored = store.write().await.set(key, value, ttl_override_ms);
        stored
    }

    // == Has ==
    pub async fn has(&self, name: &str, key: &str) -> bool {
        let Some(store) = self.lookup(name).await else {
            return false;
        };
        let found = store.write().await.has(key);
        found
    }

    // == Delete ==
    pub async fn delete(&self, name: &str, key: &str) -> bool {
        let Some(store) = self.lookup(name).await else {
            return false;
        };
        let removed = store.write().await.delete(key);
        removed
    }

    // == Invalidate ==
    /// Drops one key; same as [`delete`](Self::delete).
    pub async fn invalidate(&self, name: &str, key: &str) -> bool {
        self.delete(name, key).await
    }

    /// Drops every key starting with `prefix`, returning how many were removed.
    pub async fn invalidate_prefix(&self, name: &str, prefix: &str) -> usize {
        let Some(store) = self.lookup(name).await else {
            return 0;
        };
        let removed = store.write().await.invalidate_prefix(prefix);
        removed
    }

    /// Drops every key matching `predicate`, returning how many were removed.
    pub async fn invalidate_matching<F>(&self, name: &str, predicate: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let Some(store) = self.lookup(name).await else {
            return 0;
        };
        let removed = store.write().await.invalidate_where(predicate);
        removed
    }

    // == Clear ==
    pub async fn clear(&self, name: &str) {
        if let Some(store) = self.lookup(name).await {
            store.write().await.clear();
        }
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without any cache lock held. Concurrent misses for the
    /// same key wait for the first computation instead of starting their own.
    /// Errors from `compute` are returned unchanged and nothing is stored; a
    /// computation outliving the registry's timeout fails with
    /// [`CacheError::ComputeTimeout`]. For an unknown cache the value is
    /// computed and returned without being stored.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        name: &str,
        key: &str,
        compute: F,
        ttl_override_ms: Option<u64>,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: From<CacheError>,
    {
        let Some(store) = self.lookup(name).await else {
            return self.run_compute(name, key, compute).await;
        };

        let cached = store.write().await.get(key);
        if let Some(value) = cached {
            return Ok(value);
        }

        let _flight = self.flights.acquire(name, key).await;

        // Another caller may have filled the key while this one waited
        let filled = store.write().await.get_quiet(key);
        if let Some(value) = filled {
            return Ok(value);
        }

        let value = self.run_compute(name, key, compute).await?;
        store.write().await.set(key, value.clone(), ttl_override_ms);
        Ok(value)
    }

    // == Stats ==
    pub async fn get_stats(&self, name: &str) -> Option<CacheStats> {
        let store = self.lookup(name).await?;
        let stats = store.read().await.stats();
        Some(stats)
    }

    /// Statistics for every registered cache.
    pub async fn get_all_stats(&self) -> HashMap<String, CacheStats> {
        let stores: Vec<(String, SharedStore<V>)> = self
            .caches
            .read()
            .await
            .iter()
            .map(|(name, cache)| (name.clone(), cache.store.clone()))
            .collect();

        let mut all = HashMap::with_capacity(stores.len());
        for (name, store) in stores {
            let stats = store.read().await.stats();
            all.insert(name, stats);
        }
        all
    }

    // == Destroy ==
    /// Stops every sweeper, flushes persistent caches and drops all caches.
    ///
    /// Safe to call more than once.
    pub async fn destroy(&self) {
        let drained: Vec<(String, RegisteredCache<V>)> = self.caches.write().await.drain().collect();
        let count = drained.len();

        for (name, cache) in drained {
            shutdown(&name, cache).await;
        }

        info!(caches = count, "Cache registry destroyed");
    }

    // == Internals ==
    async fn lookup(&self, name: &str) -> Option<SharedStore<V>> {
        let store = self.store(name).await;
        if store.is_none() {
            warn!(cache = %name, "Operation on unknown cache ignored");
        }
        store
    }

    async fn run_compute<F, Fut, E>(&self, name: &str, key: &str, compute: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: From<CacheError>,
    {
        let Some(limit) = self.compute_timeout else {
            return compute().await;
        };

        match tokio::time::timeout(limit, compute()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(cache = %name, key = %key, timeout_ms = limit.as_millis() as u64, "Computation timed out");
                Err(CacheError::ComputeTimeout {
                    cache: name.to_string(),
                    key: key.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                }
                .into())
            }
        }
    }
}

/// Stops a cache's sweeper and writes its final state.
async fn shutdown<V: CacheValue>(name: &str, cache: RegisteredCache<V>) {
    cache.sweeper.abort();
    if let Err(e) = cache.sweeper.await {
        if e.is_panic() {
            warn!(cache = %name, "Expiration sweeper panicked");
        }
    }

    cache.store.read().await.flush();
    debug!(cache = %name, "Cache shut down");
}

impl<V: CacheValue> Default for CacheRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: CacheValue> Drop for CacheRegistry<V> {
    fn drop(&mut self) {
        for cache in self.caches.get_mut().values() {
            cache.sweeper.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvictionPolicy;

    fn registry() -> CacheRegistry<String> {
        CacheRegistry::new()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let registry = registry();
        registry.create_cache("b", CacheConfig::new()).await;
        registry.create_cache("a", CacheConfig::new()).await;

        assert_eq!(registry.cache_names().await, vec!["a".to_string(), "b".to_string()]);
        assert!(registry.contains_cache("a").await);
        assert!(!registry.contains_cache("c").await);
    }

    #[tokio::test]
    async fn test_recreate_drops_entries_by_default() {
        let registry = registry();
        registry.create_cache("api", CacheConfig::new()).await;
        registry.set("api", "k", "v".to_string(), None).await;

        registry.create_cache("api", CacheConfig::new().with_max_entries(5)).await;

        assert_eq!(registry.get("api", "k").await, None);
        assert_eq!(registry.get_stats("api").await.unwrap().max_size, 5);
    }

    #[tokio::test]
    async fn test_recreate_can_preserve_entries() {
        let registry = registry();
        registry.create_cache("api", CacheConfig::new()).await;
        registry.set("api", "k", "v".to_string(), None).await;

        let config = CacheConfig::new().with_policy(EvictionPolicy::Fifo);
        registry.create_cache_with("api", config, OnExisting::Preserve).await;

        assert_eq!(registry.get("api", "k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_cache_is_a_no_op() {
        let registry = registry();

        assert_eq!(registry.get("missing", "k").await, None);
        assert!(!registry.set("missing", "k", "v".to_string(), None).await);
        assert!(!registry.has("missing", "k").await);
        assert!(!registry.delete("missing", "k").await);
        assert_eq!(registry.invalidate_prefix("missing", "k").await, 0);
        registry.clear("missing").await;
        assert!(registry.get_stats("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_cache() {
        let registry = registry();
        registry.create_cache("api", CacheConfig::new()).await;

        assert!(registry.remove_cache("api").await);
        assert!(!registry.remove_cache("api").await);
        assert!(!registry.contains_cache("api").await);
    }

    #[tokio::test]
    async fn test_invalidate_matching() {
        let registry = registry();
        registry.create_cache("api", CacheConfig::new()).await;
        for key in ["user:1", "user:2", "plan:1"] {
            registry.set("api", key, key.to_string(), None).await;
        }

        let removed = registry.invalidate_matching("api", |key| key.ends_with(":1")).await;

        assert_eq!(removed, 2);
        assert!(registry.has("api", "user:2").await);
    }

    #[tokio::test]
    async fn test_drop_clears_persisted_mirror_on_recreate() {
        let registry = registry().with_persistence(PersistenceAdapter::in_memory());
        let config = || CacheConfig::new().with_persistence(true);

        registry.create_cache("p", config()).await;
        registry.set("p", "k", "v".to_string(), None).await;

        registry.create_cache("p", config()).await;

        assert!(!registry.has("p", "k").await);
    }
}
