//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! Most cache failures are absorbed and logged at the boundary where they
//! happen; these variants surface only where a caller can act on them.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Compression or decompression failed
    #[error("Codec error: {0}")]
    Codec(String),

    /// Durable mirror for one cache could not be read, written or removed
    #[error("Persistence error for '{slot}': {source}")]
    Persistence {
        slot: String,
        #[source]
        source: Box<CacheError>,
    },

    /// Underlying file system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A get_or_set computation ran past the registry's deadline
    #[error("Computation for '{key}' in cache '{cache}' timed out after {timeout_ms}ms")]
    ComputeTimeout {
        cache: String,
        key: String,
        timeout_ms: u64,
    },
}

impl CacheError {
    /// Attributes a backend or encoding failure to a cache's durable slot.
    pub fn persistence(slot: &str, source: CacheError) -> Self {
        Self::Persistence {
            slot: slot.to_string(),
            source: Box::new(source),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
