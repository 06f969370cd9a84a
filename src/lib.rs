//! Coach Cache - In-process named caches for the coaching platform
//!
//! A registry of independently configured caches with TTL expiration,
//! LRU/LFU/FIFO eviction, optional LZ4 compression, optional persistence and
//! per-cache statistics.

pub mod cache;
pub mod config;
pub mod error;
pub mod persistence;
pub mod registry;
pub mod tasks;

pub use cache::{CacheConfig, CacheStats, CacheStore, CacheValue, EvictionPolicy};
pub use config::RegistryConfig;
pub use error::{CacheError, Result};
pub use persistence::{FileBackend, MemoryBackend, PersistenceAdapter, PersistenceBackend};
pub use registry::{CacheRegistry, OnExisting};
pub use tasks::spawn_sweeper;
