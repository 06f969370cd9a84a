//! Per-key in-flight markers.
//!
//! Concurrent `get_or_set` misses for one key queue on the same marker; the
//! first caller computes while the rest wait and then re-check the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = (String, String);

/// Marker for one key plus the number of callers holding or queued on it.
#[derive(Debug)]
struct Flight {
    marker: Arc<AsyncMutex<()>>,
    interested: usize,
}

/// Table of in-flight computations keyed by `(cache, key)`.
#[derive(Debug, Default)]
pub struct SingleFlight {
    inflight: Mutex<HashMap<Slot, Flight>>,
}

/// Held while computing a value; dropping it lets the next waiter in.
pub struct FlightGuard<'a> {
    _lock: OwnedMutexGuard<()>,
    _interest: Interest<'a>,
}

/// One caller's claim on a table entry.
///
/// Released on drop whether the caller got the lock or was cancelled while
/// queued; the last claim removes the entry.
struct Interest<'a> {
    owner: &'a SingleFlight,
    slot: Slot,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds the marker for this key, then takes it.
    pub async fn acquire(&self, cache: &str, key: &str) -> FlightGuard<'_> {
        let slot = (cache.to_string(), key.to_string());
        let marker = {
            let mut table = self.table();
            let flight = table.entry(slot.clone()).or_insert_with(|| Flight {
                marker: Arc::default(),
                interested: 0,
            });
            flight.interested += 1;
            flight.marker.clone()
        };
        let interest = Interest { owner: self, slot };

        let lock = marker.lock_owned().await;
        FlightGuard {
            _lock: lock,
            _interest: interest,
        }
    }

    /// Number of keys with a computation running or queued.
    pub fn in_flight(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<Slot, Flight>> {
        self.inflight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Interest<'_> {
    fn drop(&mut self) {
        let mut table = self.owner.table();
        let Some(flight) = table.get_mut(&self.slot) else {
            return;
        };
        flight.interested -= 1;
        if flight.interested == 0 {
            table.remove(&self.slot);
        }
    }
}
