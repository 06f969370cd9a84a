//! Configuration Module
//!
//! Handles loading process-level registry settings from environment variables.
//! Per-cache settings live in [`crate::cache::CacheConfig`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Registry configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Directory for persistent caches; None disables the file backend
    pub persist_dir: Option<PathBuf>,
    /// Deadline for a single get_or_set computation, in milliseconds
    pub compute_timeout_ms: u64,
    /// Longest period between expiration sweeps, in milliseconds
    pub max_sweep_interval_ms: u64,
}

impl RegistryConfig {
    /// Creates a new RegistryConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PERSIST_DIR` - Directory for persisted caches (default: unset)
    /// - `CACHE_COMPUTE_TIMEOUT_MS` - get_or_set deadline (default: 30000)
    /// - `CACHE_MAX_SWEEP_INTERVAL_MS` - Sweep period ceiling (default: 300000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            persist_dir: env::var("CACHE_PERSIST_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            compute_timeout_ms: env::var("CACHE_COMPUTE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.compute_timeout_ms),
            max_sweep_interval_ms: env::var("CACHE_MAX_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_sweep_interval_ms),
        }
    }

    pub fn compute_timeout(&self) -> Duration {
        Duration::from_millis(self.compute_timeout_ms)
    }

    pub fn max_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.max_sweep_interval_ms)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            persist_dir: None,
            compute_timeout_ms: 30_000,
            max_sweep_interval_ms: 300_000,
        }
    }
}
