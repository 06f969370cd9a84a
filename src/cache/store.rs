//! Cache Store Module
//!
//! Main cache engine for one named cache: HashMap storage with TTL expiration,
//! policy-driven eviction, optional compression and an optional durable mirror.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{
    current_timestamp_ms, CacheConfig, CacheEntry, CacheStats, CacheValue,
    CompressionCodec, Lz4Codec, Payload,
};
use crate::persistence::PersistenceAdapter;

// == Cache Store ==
/// Storage for one named cache.
///
/// Not synchronized; the registry keeps each store behind its own lock.
pub struct CacheStore<V: CacheValue> {
    /// Cache name, also the persistence slot
    name: String,
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Settings supplied at creation
    config: CacheConfig<V>,
    /// Codec used when `config.compress` is set
    codec: Arc<dyn CompressionCodec>,
    /// Durable mirror, present only for persistent caches
    persistence: Option<PersistenceAdapter>,
    /// Performance statistics
    stats: CacheStats,
    /// Monotonic counter ordering inserts and reads
    sequence: u64,
}

impl<V: CacheValue> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty, non-persistent store.
    ///
    /// # Arguments
    /// * `name` - Cache name
    /// * `config` - Capacity, TTL, policy and codec settings
    pub fn new(name: impl Into<String>, config: CacheConfig<V>) -> Self {
        let codec = config
            .codec
            .clone()
            .unwrap_or_else(|| Arc::new(Lz4Codec::new()));
        Self {
            name: name.into(),
            entries: HashMap::new(),
            stats: CacheStats::new(config.max_entries),
            codec,
            config,
            persistence: None,
            sequence: 0,
        }
    }

    // == Open ==
    /// Creates a store and, when the config asks for persistence, loads its
    /// durable mirror.
    ///
    /// A failed load is logged and yields an empty cache.
    pub fn open(
        name: impl Into<String>,
        config: CacheConfig<V>,
        persistence: Option<PersistenceAdapter>,
    ) -> Self {
        let mut store = Self::new(name, config);
        if !store.config.persistent {
            return store;
        }

        let Some(adapter) = persistence else {
            warn!(cache = %store.name, "Persistent cache has no backend, running in memory only");
            return store;
        };

        match adapter.load::<V>(&store.name) {
            Ok(entries) => store.restore(entries),
            Err(e) => warn!(cache = %store.name, error = %e, "Failed to load persisted cache"),
        }
        store.persistence = Some(adapter);
        store
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL override.
    ///
    /// Rejected values (validator returned false) are logged and leave any
    /// existing entry untouched. If the key is new and the cache is full,
    /// expired entries are purged first and then one entry is evicted by the
    /// configured policy.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_override_ms` - Lifetime for this entry; None or 0 uses the cache TTL
    ///
    /// # Returns
    /// true if the value was stored.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_override_ms: Option<u64>) -> bool {
        let key = key.into();
        if !self.config.accepts(&value) {
            warn!(cache = %self.name, key = %key, "Value rejected by validator");
            return false;
        }

        let now = current_timestamp_ms();
        let ttl_ms = ttl_override_ms
            .filter(|ttl| *ttl > 0)
            .unwrap_or(self.config.ttl_ms);
        let (payload, size_estimate) = self.encode(&key, value);

        if !self.entries.contains_key(&key) {
            self.make_room(now);
        }

        let mut entry = CacheEntry::new(payload, ttl_ms, size_estimate, now);
        let seq = self.next_seq();
        entry.inserted_seq = seq;
        entry.accessed_seq = seq;
        self.entries.insert(key, entry);

        self.persist();
        true
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let value = self.lookup(key);
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Like [`get`](Self::get) but leaves hit/miss counters alone.
    ///
    /// Used to re-check a key the caller has already counted as a miss.
    pub fn get_quiet(&mut self, key: &str) -> Option<V> {
        self.lookup(key)
    }

    // == Has ==
    /// Returns true if a live entry exists for `key`.
    ///
    /// Does not count as a read: statistics and eviction order are unchanged.
    pub fn has(&mut self, key: &str) -> bool {
        let now = current_timestamp_ms();
        let live = match self.entries.get(key) {
            Some(entry) => entry.is_live_at(now),
            None => return false,
        };
        if !live {
            self.remove_expired(key);
        }
        live
    }

    // == Delete ==
    /// Removes an entry by key, live or not.
    ///
    /// # Returns
    /// true if an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    // == Invalidate ==
    /// Removes every entry whose key matches `predicate`.
    ///
    /// # Returns
    /// The number of entries removed.
    pub fn invalidate_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Removes every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        self.invalidate_where(|key| key.starts_with(prefix))
    }

    // == Clear ==
    /// Removes all entries and the durable mirror.
    ///
    /// Hit, miss and eviction counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(adapter) = &self.persistence {
            if let Err(e) = adapter.clear(&self.name) {
                warn!(cache = %self.name, error = %e, "Failed to clear persisted cache");
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = current_timestamp_ms();
        let memory_usage = self
            .entries
            .values()
            .filter(|entry| entry.is_live_at(now))
            .map(|entry| entry.size_estimate)
            .sum();

        let mut stats = self.stats.clone();
        stats.set_gauges(self.entries.len(), memory_usage);
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let removed = self.purge_expired(current_timestamp_ms());
        if removed > 0 {
            self.persist();
        }
        removed
    }

    // == Flush ==
    /// Writes the full entry table to the durable mirror, if any.
    pub fn flush(&self) {
        self.persist();
    }

    // == Take / Restore ==
    /// Empties the store and hands back its entries, oldest insert first.
    ///
    /// The durable mirror is left as it was.
    pub fn take_entries(&mut self) -> Vec<(String, CacheEntry<V>)> {
        let mut entries: Vec<_> = self.entries.drain().collect();
        entries.sort_by_key(|(_, entry)| entry.inserted_seq);
        entries
    }

    /// Inserts previously stored entries, dropping expired ones.
    ///
    /// Ordering is rebuilt from the entries' timestamps. If there are more
    /// entries than capacity, the policy evicts the surplus.
    pub fn restore(&mut self, mut entries: Vec<(String, CacheEntry<V>)>) {
        let now = current_timestamp_ms();
        entries.retain(|(_, entry)| entry.is_live_at(now));

        // Access order first so insertion sequences stay contiguous below
        let mut by_access: Vec<usize> = (0..entries.len()).collect();
        by_access.sort_by_key(|&i| (entries[i].1.last_accessed_at, entries[i].1.accessed_seq));
        let base = self.sequence;
        for (rank, &i) in by_access.iter().enumerate() {
            entries[i].1.accessed_seq = base + rank as u64 + 1;
        }
        self.sequence = base + entries.len() as u64;

        entries.sort_by_key(|(_, entry)| (entry.inserted_at, entry.inserted_seq));
        for (key, mut entry) in entries {
            if !self.entries.contains_key(&key) {
                self.make_room(now);
            }
            entry.inserted_seq = self.next_seq();
            self.entries.insert(key, entry);
        }
    }

    // == Accessors ==
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CacheConfig<V> {
        &self.config
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Keys currently stored, live or not.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the entry for `key` without touching it.
    pub fn peek_entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Internals ==
    fn next_seq(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Shared read path for `get` and `get_quiet`.
    fn lookup(&mut self, key: &str) -> Option<V> {
        let now = current_timestamp_ms();
        let expired = self.entries.get(key)?.is_expired_at(now);
        if expired {
            self.remove_expired(key);
            return None;
        }

        let seq = self.next_seq();
        let entry = self.entries.get_mut(key)?;
        entry.touch(now, seq);
        let payload = entry.payload.clone();

        let value = self.decode(key, payload);
        if value.is_none() {
            self.entries.remove(key);
        }
        value
    }

    fn remove_expired(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.stats.record_expirations(1);
        }
    }

    fn purge_expired(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live_at(now));
        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    /// Frees one slot for a new key when the cache is full.
    fn make_room(&mut self, now: u64) {
        if self.entries.len() < self.config.max_entries {
            return;
        }

        self.purge_expired(now);

        while self.entries.len() >= self.config.max_entries {
            let Some(victim) = self.config.policy.select_victim(&self.entries) else {
                break;
            };
            let victim = victim.to_string();
            self.entries.remove(&victim);
            self.stats.record_eviction();
            debug!(cache = %self.name, key = %victim, policy = %self.config.policy, "Evicted entry");
        }
    }

    /// Builds the stored payload and its size estimate.
    fn encode(&self, key: &str, value: V) -> (Payload<V>, usize) {
        if self.config.compress {
            if let Some(text) = value.as_text() {
                match self.codec.encode(text) {
                    Ok(bytes) => {
                        let size = bytes.len();
                        return (Payload::Compressed(bytes), size);
                    }
                    Err(e) => {
                        warn!(cache = %self.name, key = %key, error = %e, "Compression failed, storing uncompressed");
                    }
                }
            }
        }
        let size = value.size_estimate();
        (Payload::Plain(value), size)
    }

    /// Turns a stored payload back into a value.
    ///
    /// If the codec fails the raw bytes are read as text; None only when the
    /// value type cannot be built from text at all.
    fn decode(&self, key: &str, payload: Payload<V>) -> Option<V> {
        let bytes = match payload {
            Payload::Plain(value) => return Some(value),
            Payload::Compressed(bytes) => bytes,
        };

        let text = match self.codec.decode(&bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(cache = %self.name, key = %key, error = %e, "Decompression failed, returning raw value");
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };

        let value = V::from_text(text);
        if value.is_none() {
            warn!(cache = %self.name, key = %key, "Stored text cannot be converted back, dropping entry");
        }
        value
    }

    fn persist(&self) {
        let Some(adapter) = &self.persistence else {
            return;
        };

        let mut ordered: Vec<_> = self.entries.iter().collect();
        ordered.sort_by_key(|(_, entry)| entry.inserted_seq);
        if let Err(e) = adapter.save(&self.name, ordered) {
            warn!(cache = %self.name, error = %e, "Failed to persist cache");
        }
    }
}

impl<V: CacheValue> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("name", &self.name)
            .field("len", &self.entries.len())
            .field("config", &self.config)
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvictionPolicy;
    use crate::error::CacheError;
    use std::thread::sleep;
    use std::time::Duration;

    fn config(max_entries: usize) -> CacheConfig<String> {
        CacheConfig::new().with_max_entries(max_entries).with_ttl_ms(300_000)
    }

    fn store(max_entries: usize) -> CacheStore<String> {
        CacheStore::new("test", config(max_entries))
    }

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.name(), "test");
        assert!(!store.is_persistent());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        assert!(store.set("key1", s("value1"), None));
        assert_eq!(store.get("key1"), Some(s("value1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);

        store.set("key1", s("value1"), None);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = store(100);
        assert!(!store.delete("nonexistent"));
    }

    #[test]
    fn test_store_overwrite_resets_metadata() {
        let mut store = store(100);

        store.set("key1", s("value1"), None);
        store.get("key1");
        store.set("key1", s("value2"), None);

        let entry = store.peek_entry("key1").unwrap();
        assert_eq!(entry.access_count, 0);
        assert_eq!(store.get("key1"), Some(s("value2")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);

        store.set("x", s("y"), Some(50));
        assert!(store.has("x"));

        sleep(Duration::from_millis(80));

        let misses_before = store.stats().misses;
        assert_eq!(store.get("x"), None);
        let stats = store.stats();
        assert_eq!(stats.misses, misses_before + 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_has_does_not_touch_stats_or_order() {
        let mut store = store(2);

        store.set("a", s("1"), None);
        store.set("b", s("2"), None);
        assert!(store.has("a"));
        assert!(!store.has("zzz"));

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);

        // has("a") did not refresh it, so a is still least recently used
        store.set("c", s("3"), None);
        assert!(!store.has("a"));
        assert!(store.has("b"));
    }

    #[test]
    fn test_has_removes_expired_entry() {
        let mut store = store(10);
        store.set("k", s("v"), Some(20));

        sleep(Duration::from_millis(50));

        assert!(!store.has("k"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        store.set("key1", s("value1"), None);
        store.set("key2", s("value2"), None);
        store.set("key3", s("value3"), None);

        // Cache is full, adding key4 should evict key1 (oldest)
        store.set("key4", s("value4"), None);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(2);

        store.set("a", s("1"), None);
        store.set("b", s("2"), None);
        assert_eq!(store.get("a"), Some(s("1")));

        store.set("c", s("3"), None);

        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some(s("1")));
        assert_eq!(store.get("c"), Some(s("3")));
    }

    #[test]
    fn test_store_fifo_ignores_reads() {
        let mut store = CacheStore::new("fifo", config(2).with_policy(EvictionPolicy::Fifo));

        store.set("a", s("1"), None);
        store.set("b", s("2"), None);
        store.get("a");
        store.get("a");

        store.set("c", s("3"), None);

        assert!(!store.has("a"));
        assert!(store.has("b"));
        assert!(store.has("c"));
    }

    #[test]
    fn test_store_lfu_evicts_least_read() {
        let mut store = CacheStore::new("lfu", config(2).with_policy(EvictionPolicy::Lfu));

        store.set("a", s("1"), None);
        store.set("b", s("2"), None);
        for _ in 0..3 {
            store.get("a");
        }

        store.set("c", s("3"), None);

        assert!(store.has("a"));
        assert!(!store.has("b"));
        assert!(store.has("c"));
    }

    #[test]
    fn test_full_cache_purges_expired_before_evicting() {
        let mut store = store(2);

        store.set("short", s("1"), Some(20));
        store.set("long", s("2"), None);
        sleep(Duration::from_millis(50));

        store.set("new", s("3"), None);

        let stats = store.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
        assert!(store.has("long"));
        assert!(store.has("new"));
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);

        store.set("a", s("1"), None);
        store.set("b", s("2"), None);
        store.set("a", s("3"), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_validator_rejects_without_touching_existing() {
        let config = config(10).with_validator(|v: &String| !v.is_empty());
        let mut store = CacheStore::new("validated", config);

        assert!(store.set("k", s("good"), None));
        assert!(!store.set("k", s(""), None));

        assert_eq!(store.get("k"), Some(s("good")));
    }

    #[test]
    fn test_zero_ttl_override_uses_default() {
        let mut store = store(10);
        store.set("k", s("v"), Some(0));
        assert_eq!(store.peek_entry("k").unwrap().ttl_ms, 300_000);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);

        store.set("key1", s("value1"), None);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.5);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.max_size, 100);
        assert_eq!(stats.memory_usage, 12);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut store = store(10);
        store.set("a", s("1"), None);
        store.set("b", s("2"), None);
        store.get("a");

        store.clear();
        let first = store.stats();
        store.clear();
        let second = store.stats();

        for stats in [first, second] {
            assert_eq!(stats.size, 0);
            assert_eq!(stats.memory_usage, 0);
            assert_eq!(stats.hits, 1);
        }
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);

        store.set("key1", s("value1"), Some(20));
        store.set("key2", s("value2"), Some(10_000));

        sleep(Duration::from_millis(50));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_invalidate_prefix() {
        let mut store = store(10);
        store.set("tenant:1:workouts", s("a"), None);
        store.set("tenant:1:meals", s("b"), None);
        store.set("tenant:2:workouts", s("c"), None);

        assert_eq!(store.invalidate_prefix("tenant:1:"), 2);
        assert_eq!(store.keys(), vec![s("tenant:2:workouts")]);
    }

    #[test]
    fn test_compressed_round_trip() {
        let mut store = CacheStore::new("zip", config(10).with_compression(true));
        let text = "push ups ".repeat(100);

        store.set("page", text.clone(), None);

        let entry = store.peek_entry("page").unwrap();
        assert!(entry.is_compressed());
        assert!(entry.size_estimate < text.len());
        assert_eq!(store.get("page"), Some(text));
    }

    #[test]
    fn test_non_text_values_are_not_compressed() {
        let config = CacheConfig::<i64>::new().with_compression(true);
        let mut store = CacheStore::new("numbers", config);

        store.set("n", 42, None);

        assert!(!store.peek_entry("n").unwrap().is_compressed());
        assert_eq!(store.get("n"), Some(42));
    }

    #[derive(Debug)]
    struct FailingCodec;

    impl CompressionCodec for FailingCodec {
        fn encode(&self, _text: &str) -> crate::error::Result<Vec<u8>> {
            Err(CacheError::Codec("encoder offline".to_string()))
        }

        fn decode(&self, _bytes: &[u8]) -> crate::error::Result<String> {
            Err(CacheError::Codec("decoder offline".to_string()))
        }
    }

    #[test]
    fn test_encode_failure_stores_uncompressed() {
        let config = config(10).with_compression(true).with_codec(Arc::new(FailingCodec));
        let mut store = CacheStore::new("failing", config);

        assert!(store.set("k", s("value"), None));

        assert!(!store.peek_entry("k").unwrap().is_compressed());
        assert_eq!(store.get("k"), Some(s("value")));
    }

    #[test]
    fn test_decode_failure_returns_raw_value() {
        let config = config(10).with_compression(true).with_codec(Arc::new(FailingCodec));
        let mut store = CacheStore::new("failing", config);
        store.restore(vec![(
            s("k"),
            CacheEntry::new(Payload::Compressed(b"raw".to_vec()), 60_000, 3, current_timestamp_ms()),
        )]);

        assert_eq!(store.get("k"), Some(s("raw")));
    }

    #[test]
    fn test_persistent_store_reloads_entries() {
        let adapter = PersistenceAdapter::in_memory();
        let config = config(10).with_persistence(true);

        let mut first = CacheStore::open("persisted", config.clone(), Some(adapter.clone()));
        first.set("k", s("v"), Some(10_000));
        first.set("gone", s("x"), None);
        first.delete("gone");

        let mut second = CacheStore::open("persisted", config, Some(adapter));
        assert_eq!(second.get("k"), Some(s("v")));
        assert!(!second.has("gone"));
    }

    #[test]
    fn test_persistent_store_drops_expired_on_load() {
        let adapter = PersistenceAdapter::in_memory();
        let config = config(10).with_persistence(true);

        let mut first = CacheStore::open("persisted", config.clone(), Some(adapter.clone()));
        first.set("k", s("v"), Some(30));

        sleep(Duration::from_millis(60));

        let mut second = CacheStore::open("persisted", config, Some(adapter));
        assert!(second.is_empty());
        assert_eq!(second.get("k"), None);
    }

    #[test]
    fn test_clear_wipes_durable_mirror() {
        let adapter = PersistenceAdapter::in_memory();
        let config = config(10).with_persistence(true);

        let mut first = CacheStore::open("persisted", config.clone(), Some(adapter.clone()));
        first.set("k", s("v"), None);
        first.clear();

        let second = CacheStore::open("persisted", config, Some(adapter));
        assert!(second.is_empty());
    }

    #[test]
    fn test_persistent_without_backend_runs_in_memory() {
        let mut store = CacheStore::open("orphan", config(10).with_persistence(true), None);
        store.set("k", s("v"), None);
        assert!(!store.is_persistent());
        assert_eq!(store.get("k"), Some(s("v")));
    }

    #[test]
    fn test_take_and_restore_preserves_order() {
        let mut old = store(3);
        old.set("a", s("1"), None);
        old.set("b", s("2"), None);
        old.set("c", s("3"), None);
        old.get("a");

        let entries = old.take_entries();
        assert!(old.is_empty());
        assert_eq!(entries.len(), 3);

        let mut new = store(3);
        new.restore(entries);
        new.set("d", s("4"), None);

        // b was least recently used before the move
        assert!(!new.has("b"));
        assert!(new.has("a"));
    }

    #[test]
    fn test_restore_into_smaller_cache_evicts_surplus() {
        let mut old = store(5);
        for key in ["a", "b", "c", "d"] {
            old.set(key, s(key), None);
        }

        let mut new = store(2);
        new.restore(old.take_entries());

        assert_eq!(new.len(), 2);
        assert!(new.has("c"));
        assert!(new.has("d"));
    }
}
