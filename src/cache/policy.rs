//! Eviction Policy Module
//!
//! Chooses which entry to remove when a cache is at capacity.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

// == Eviction Policy ==
/// Strategy for picking an eviction victim.
///
/// Selection is pure: the policy reads the entry table and names a key, the
/// store performs the removal.
///
/// * `Lru` - smallest last access
/// * `Lfu` - smallest access count, ties go to the least recently used
/// * `Fifo` - earliest insertion, reads do not matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    #[default]
    Lru,
    Lfu,
    Fifo,
}

impl EvictionPolicy {
    // == Select Victim ==
    /// Returns the key that should be evicted, or None for an empty table.
    ///
    /// Ordering uses the store's sequence numbers, which advance with
    /// `last_accessed_at` and `inserted_at` but never tie.
    pub fn select_victim<'a, V>(&self, entries: &'a HashMap<String, CacheEntry<V>>) -> Option<&'a str> {
        let victim = match self {
            EvictionPolicy::Lru => entries.iter().min_by_key(|(_, e)| e.accessed_seq),
            EvictionPolicy::Lfu => entries
                .iter()
                .min_by_key(|(_, e)| (e.access_count, e.accessed_seq)),
            EvictionPolicy::Fifo => entries.iter().min_by_key(|(_, e)| e.inserted_seq),
        };
        victim.map(|(key, _)| key.as_str())
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Lfu => "lfu",
            EvictionPolicy::Fifo => "fifo",
        };
        f.write_str(name)
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            "fifo" => Ok(EvictionPolicy::Fifo),
            other => Err(format!("unknown eviction policy '{}'", other)),
        }
    }
}
