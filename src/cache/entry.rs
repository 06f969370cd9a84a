//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};

// == Payload ==
/// Stored form of a cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload<V> {
    /// Value kept as-is
    Plain(V),
    /// Text value kept as codec output
    Compressed(Vec<u8>),
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub payload: Payload<V>,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Last successful read (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Lifetime measured from `inserted_at`
    pub ttl_ms: u64,
    /// Number of successful reads
    pub access_count: u64,
    /// Approximate footprint in bytes
    pub size_estimate: usize,
    /// Store-local insertion order
    #[serde(skip)]
    pub(crate) inserted_seq: u64,
    /// Store-local access order
    #[serde(skip)]
    pub(crate) accessed_seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry inserted at `now`.
    ///
    /// # Arguments
    /// * `payload` - The stored value
    /// * `ttl_ms` - Lifetime in milliseconds
    /// * `size_estimate` - Approximate footprint in bytes
    /// * `now` - Insertion time (Unix milliseconds)
    pub fn new(payload: Payload<V>, ttl_ms: u64, size_estimate: usize, now: u64) -> Self {
        Self {
            payload,
            inserted_at: now,
            last_accessed_at: now,
            ttl_ms,
            access_count: 0,
            size_estimate,
            inserted_seq: 0,
            accessed_seq: 0,
        }
    }

    // == Compressed ==
    /// Returns true if the payload holds codec output.
    pub fn is_compressed(&self) -> bool {
        matches!(self.payload, Payload::Compressed(_))
    }

    // == Liveness ==
    /// An entry is live while no more than `ttl_ms` has elapsed since insertion.
    pub fn is_live_at(&self, now: u64) -> bool {
        now.saturating_sub(self.inserted_at) <= self.ttl_ms
    }

    /// Checks expiry against an explicit clock reading.
    pub fn is_expired_at(&self, now: u64) -> bool {
        !self.is_live_at(now)
    }

    /// Checks expiry against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.inserted_at.saturating_add(self.ttl_ms).saturating_sub(now)
    }

    // == Touch ==
    /// Records a successful read.
    pub(crate) fn touch(&mut self, now: u64, seq: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
        self.accessed_seq = seq;
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
