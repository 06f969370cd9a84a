//! Background Tasks Module
//!
//! Contains background tasks that run periodically while caches are alive.
//!
//! # Tasks
//! - Expiration sweep: removes expired entries from one cache on a fixed period

mod sweeper;

pub use sweeper::{spawn_sweeper, sweep_interval, MAX_SWEEP_INTERVAL};
