//! Cache Configuration Module
//!
//! Per-cache settings supplied when a cache is created.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CompressionCodec, EvictionPolicy};

// == Defaults ==
/// Default entry lifetime: 10 minutes
pub const DEFAULT_TTL_MS: u64 = 10 * 60 * 1000;

/// Default capacity
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Predicate deciding whether a value may be cached.
pub type Validator<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

// == Cache Config ==
/// Settings for one named cache.
pub struct CacheConfig<V> {
    /// Entry lifetime in milliseconds
    pub ttl_ms: u64,
    /// Maximum number of entries
    pub max_entries: usize,
    /// Victim selection when full
    pub policy: EvictionPolicy,
    /// Mirror contents to the registry's persistence backend
    pub persistent: bool,
    /// Compress string-like values
    pub compress: bool,
    /// Writes failing this predicate are rejected
    pub validate: Option<Validator<V>>,
    /// Codec override, LZ4 when None
    pub codec: Option<Arc<dyn CompressionCodec>>,
}

impl<V> CacheConfig<V> {
    /// Creates a config with default settings.
    pub fn new() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            max_entries: DEFAULT_MAX_ENTRIES,
            policy: EvictionPolicy::default(),
            persistent: false,
            compress: false,
            validate: None,
            codec: None,
        }
    }

    /// Sets the entry lifetime in milliseconds (minimum 1).
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms.max(1);
        self
    }

    /// Sets the entry lifetime.
    pub fn with_ttl(self, ttl: Duration) -> Self {
        self.with_ttl_ms(ttl.as_millis() as u64)
    }

    /// Sets the capacity (minimum 1).
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_persistence(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Installs a write predicate.
    pub fn with_validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Replaces the default LZ4 codec.
    pub fn with_codec(mut self, codec: Arc<dyn CompressionCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Returns true if `value` passes the configured predicate.
    pub fn accepts(&self, value: &V) -> bool {
        self.validate.as_ref().map_or(true, |validate| validate(value))
    }
}

impl<V> Default for CacheConfig<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for CacheConfig<V> {
    fn clone(&self) -> Self {
        Self {
            ttl_ms: self.ttl_ms,
            max_entries: self.max_entries,
            policy: self.policy,
            persistent: self.persistent,
            compress: self.compress,
            validate: self.validate.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl<V> fmt::Debug for CacheConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("ttl_ms", &self.ttl_ms)
            .field("max_entries", &self.max_entries)
            .field("policy", &self.policy)
            .field("persistent", &self.persistent)
            .field("compress", &self.compress)
            .field("validate", &self.validate.is_some())
            .field("codec", &self.codec)
            .finish()
    }
}
