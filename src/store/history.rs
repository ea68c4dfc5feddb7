//! In-memory history list kept by the session.
//!
//! Newest entry first, never more than `HISTORY_LIMIT` entries; pushing past
//! the limit evicts the oldest one.

use crate::scan::HistoryEntry;

pub const HISTORY_LIMIT: usize = 10;

/// Bounded list of completed scans, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Takes a persisted list as-is (already newest first), dropping anything
    /// past the limit.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        History { entries }
    }

    /// Prepends `entry`, returning the oldest entry if it fell off the end.
    pub fn push_front(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.insert(0, entry);

        if self.entries.len() > HISTORY_LIMIT {
            self.entries.pop()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn newest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
