use std::sync::{Arc, Mutex, PoisonError};

use super::{decode, encode, HistoryStore};
use crate::error::StoreError;
use crate::scan::HistoryEntry;

/// In-process store. Clones share the same slot, so a test can keep one
/// handle and inspect what the session wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// The persisted JSON value, if any.
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>, StoreError> {
        self.lock().as_deref().map(decode).transpose()
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let value = encode(entries)?;
        *self.lock() = Some(value);
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StoreError> {
        *self.lock() = None;
        Ok(())
    }
}
