//! In-memory persistence backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::PersistenceBackend;
use crate::error::Result;

/// Slots held in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all written slots.
    pub fn slot_names(&self) -> Vec<String> {
        self.slots().keys().cloned().collect()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written slot
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistenceBackend for MemoryBackend {
    fn read_slot(&self, name: &str) -> Result<Option<String>> {
        Ok(self.slots().get(name).cloned())
    }

    fn write_slot(&self, name: &str, contents: &str) -> Result<()> {
        self.slots().insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn remove_slot(&self, name: &str) -> Result<()> {
        self.slots().remove(name);
        Ok(())
    }
}
