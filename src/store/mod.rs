//! History persistence.
//!
//! The history list lives under a single storage key as a JSON array,
//! newest first. A store is injected into the session, which loads it once
//! and writes it back after every change:
//! - `SqliteStore`: key/value table in a local SQLite database
//! - `MemoryStore`: in-process, for tests and `--ephemeral` runs

pub mod history;
pub mod memory;
pub mod sqlite;

pub use history::{History, HISTORY_LIMIT};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::scan::HistoryEntry;

pub const HISTORY_KEY: &str = "encode_history";

pub trait HistoryStore: Send + 'static {
    /// `Ok(None)` when nothing has been saved under the history key.
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>, StoreError>;

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError>;

    fn remove(&mut self) -> Result<(), StoreError>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for Box<S> {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        (**self).save(entries)
    }

    fn remove(&mut self) -> Result<(), StoreError> {
        (**self).remove()
    }
}

pub(crate) fn encode(entries: &[HistoryEntry]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(entries)?)
}

pub(crate) fn decode(value: &str) -> Result<Vec<HistoryEntry>, StoreError> {
    Ok(serde_json::from_str(value)?)
}
