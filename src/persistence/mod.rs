//! Persistence Module
//!
//! Durable mirror of a cache's entry table, one slot per cache name.
//!
//! # Backends
//! - [`FileBackend`]: one JSON document per cache in a directory
//! - [`MemoryBackend`]: process-local slots, used in tests and embedded setups

mod file;
mod memory;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{current_timestamp_ms, CacheEntry, CacheValue};
use crate::error::{CacheError, Result};

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Version tag written into every persisted document
pub const SNAPSHOT_VERSION: u32 = 1;

// == Persistence Backend ==
/// Raw durable key-value slots.
///
/// Implementations only move strings; encoding and expiry filtering live in
/// [`PersistenceAdapter`].
pub trait PersistenceBackend: Send + Sync + fmt::Debug {
    /// Reads a slot, `None` if it was never written.
    fn read_slot(&self, name: &str) -> Result<Option<String>>;

    /// Replaces a slot's contents.
    fn write_slot(&self, name: &str, contents: &str) -> Result<()>;

    /// Deletes a slot. Missing slots are not an error.
    fn remove_slot(&self, name: &str) -> Result<()>;
}

// == Persisted Cache ==
/// Document stored in a slot.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedCache<V> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<(String, CacheEntry<V>)>,
}

// == Persistence Adapter ==
/// Typed load/save over a shared backend.
#[derive(Debug, Clone)]
pub struct PersistenceAdapter {
    backend: Arc<dyn PersistenceBackend>,
}

impl PersistenceAdapter {
    // == Constructor ==
    pub fn new(backend: Arc<dyn PersistenceBackend>) -> Self {
        Self { backend }
    }

    /// Adapter over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    // == Load ==
    /// Loads a cache's entries, discarding any that expired while stored.
    pub fn load<V: CacheValue>(&self, name: &str) -> Result<Vec<(String, CacheEntry<V>)>> {
        self.load_at(name, current_timestamp_ms())
    }

    /// Loads against an explicit clock reading.
    ///
    /// Failures come back as [`CacheError::Persistence`] naming the slot.
    pub fn load_at<V: CacheValue>(&self, name: &str, now: u64) -> Result<Vec<(String, CacheEntry<V>)>> {
        let contents = self
            .backend
            .read_slot(name)
            .map_err(|e| CacheError::persistence(name, e))?;
        let Some(contents) = contents else {
            return Ok(Vec::new());
        };

        let document: PersistedCache<V> = serde_json::from_str(&contents)
            .map_err(|e| CacheError::persistence(name, e.into()))?;
        let total = document.entries.len();
        let live: Vec<_> = document
            .entries
            .into_iter()
            .filter(|(_, entry)| entry.is_live_at(now))
            .collect();

        debug!(
            cache = %name,
            loaded = live.len(),
            discarded = total - live.len(),
            "Loaded persisted cache"
        );
        Ok(live)
    }

    // == Save ==
    /// Writes the full entry table, in the order given.
    pub fn save<'a, V, I>(&self, name: &str, entries: I) -> Result<()>
    where
        V: CacheValue,
        I: IntoIterator<Item = (&'a String, &'a CacheEntry<V>)>,
    {
        let document = PersistedCache {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            entries: entries
                .into_iter()
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
        };
        serde_json::to_string(&document)
            .map_err(CacheError::from)
            .and_then(|contents| self.backend.write_slot(name, &contents))
            .map_err(|e| CacheError::persistence(name, e))
    }

    // == Clear ==
    /// Removes a cache's durable slot.
    pub fn clear(&self, name: &str) -> Result<()> {
        self.backend
            .remove_slot(name)
            .map_err(|e| CacheError::persistence(name, e))
    }
}
