//! Cache Module
//!
//! Provides named in-memory caches with TTL expiration, LRU/LFU/FIFO
//! eviction, optional compression and optional persistence.

mod codec;
mod config;
mod entry;
mod policy;
mod stats;
mod store;
mod value;


// Re-export public types
pub use codec::{CompressionCodec, Lz4Codec};
pub use config::{CacheConfig, Validator, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_MS};
pub use entry::{current_timestamp_ms, CacheEntry, Payload};
pub use policy::EvictionPolicy;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use value::{text_size, CacheValue};
