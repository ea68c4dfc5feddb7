use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::scan::{catalog, HistoryEntry};
use crate::store::{History, HistoryStore};

/// Identifies one capture/upload -> analyzing -> result traversal. Timer
/// callbacks carry the id of the cycle that scheduled them and are ignored
/// once the session has moved on.
pub type CycleId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Scanning,
    Uploading,
    Analyzing,
    Result,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Scanning => "scanning",
            Phase::Uploading => "uploading",
            Phase::Analyzing => "analyzing",
            Phase::Result => "result",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scanning,
    Uploading { image: String },
    Analyzing { image_override: Option<String> },
    Result(HistoryEntry),
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self {
            SessionState::Idle => Phase::Idle,
            SessionState::Scanning => Phase::Scanning,
            SessionState::Uploading { .. } => Phase::Uploading,
            SessionState::Analyzing { .. } => Phase::Analyzing,
            SessionState::Result(_) => Phase::Result,
        }
    }

    pub fn current_result(&self) -> Option<&HistoryEntry> {
        match self {
            SessionState::Result(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Synchronous scan session state machine.
///
/// Owns the state, the demo cursor and the history list. Knows nothing
/// about time: whoever drives it decides when `begin_analysis` and
/// `complete_analysis` happen (see `ScanSession`).
pub struct SessionCore<S> {
    store: S,
    state: SessionState,
    history: History,
    cursor: usize,
    cycle: CycleId,
}

impl<S: HistoryStore> SessionCore<S> {
    /// Loads the persisted history once. A missing or unreadable value
    /// starts the session with an empty list.
    pub fn new(store: S) -> Self {
        let history = match store.load() {
            Ok(Some(entries)) => History::from_entries(entries),
            Ok(None) => History::new(),
            Err(e) => {
                warn!("Failed to load history, starting empty: {e}");
                History::new()
            }
        };

        debug!(entries = history.len(), "Session created");

        SessionCore {
            store,
            state: SessionState::Idle,
            history,
            cursor: 0,
            cycle: 0,
        }
    }

    pub fn begin_camera_scan(&mut self) -> Option<CycleId> {
        if !self.is_idle("camera scan") {
            return None;
        }

        self.state = SessionState::Scanning;
        Some(self.next_cycle())
    }

    /// No-op when `image` is missing or blank.
    pub fn begin_upload(&mut self, image: Option<String>) -> Option<CycleId> {
        let Some(image) = image.filter(|i| !i.trim().is_empty()) else {
            debug!("Upload ignored: no image supplied");
            return None;
        };

        if !self.is_idle("upload") {
            return None;
        }

        self.state = SessionState::Uploading { image };
        Some(self.next_cycle())
    }

    /// Capture or upload finished: move on to analyzing.
    pub fn begin_analysis(&mut self, cycle: CycleId) -> bool {
        if cycle != self.cycle {
            return false;
        }

        let image_override = match &self.state {
            SessionState::Scanning => None,
            SessionState::Uploading { image } => Some(image.clone()),
            _ => return false,
        };

        self.state = SessionState::Analyzing { image_override };
        debug!(cycle, "Analyzing");
        true
    }

    /// Analysis finished: record the next canned result and show it.
    ///
    /// This is the only way into `SessionState::Result`.
    pub fn complete_analysis(&mut self, cycle: CycleId, now: DateTime<Utc>) -> Option<&HistoryEntry> {
        if cycle != self.cycle {
            return None;
        }

        let SessionState::Analyzing { image_override } = &self.state else {
            return None;
        };

        let template = catalog::pick(self.cursor);
        let result = match image_override {
            Some(image) => template.with_image(image.as_str()),
            None => template,
        };

        let entry = HistoryEntry::new(result, now, self.history.newest().map(|e| e.id));

        if let Some(evicted) = self.history.push_front(entry.clone()) {
            debug!(id = evicted.id, "Evicted oldest history entry");
        }
        self.persist();

        self.cursor += 1;
        self.state = SessionState::Result(entry);
        self.state.current_result()
    }

    /// Back to idle from anywhere. Any cycle in flight is abandoned; cursor
    /// and history stay as they are.
    pub fn reset(&mut self) {
        self.next_cycle();
        self.state = SessionState::Idle;
    }

    /// Empties the history and deletes the persisted value. Leaves the
    /// session state alone.
    pub fn clear_history(&mut self) {
        self.history.clear();

        if let Err(e) = self.store.remove() {
            warn!("Failed to remove persisted history: {e}");
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn current_result(&self) -> Option<&HistoryEntry> {
        self.state.current_result()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn is_idle(&self, operation: &str) -> bool {
        let idle = matches!(self.state, SessionState::Idle);
        if !idle {
            debug!(phase = %self.phase(), "Ignoring {operation}: session busy");
        }
        idle
    }

    fn next_cycle(&mut self) -> CycleId {
        self.cycle += 1;
        self.cycle
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(self.history.entries()) {
            warn!("Failed to persist history: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{RiskLevel, Variant};
    use crate::store::{MemoryStore, HISTORY_LIMIT};

    fn new_core() -> (SessionCore<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (SessionCore::new(store.clone()), store)
    }

    fn full_cycle(core: &mut SessionCore<MemoryStore>) -> HistoryEntry {
        let cycle = core.begin_camera_scan().unwrap();
        assert!(core.begin_analysis(cycle));
        let entry = core.complete_analysis(cycle, Utc::now()).unwrap().clone();
        core.reset();
        entry
    }

    #[test]
    fn fresh_session_is_idle_and_empty() {
        let (core, _) = new_core();
        assert_eq!(core.phase(), Phase::Idle);
        assert!(core.current_result().is_none());
        assert!(core.history().is_empty());
        assert_eq!(core.cursor(), 0);
    }

    #[test]
    fn camera_cycle_walks_through_every_phase() {
        let (mut core, store) = new_core();

        let cycle = core.begin_camera_scan().unwrap();
        assert_eq!(core.phase(), Phase::Scanning);

        assert!(core.begin_analysis(cycle));
        assert_eq!(core.state(), &SessionState::Analyzing { image_override: None });

        let entry = core.complete_analysis(cycle, Utc::now()).unwrap().clone();
        assert_eq!(core.phase(), Phase::Result);
        assert_eq!(entry.result.product_name, "Mega Fizz Soda");
        assert_eq!(entry.result.risk_level, RiskLevel::High);
        assert_eq!(entry.result.variant(), Variant::Alert);
        assert_eq!(core.history().len(), 1);
        assert_eq!(core.cursor(), 1);
        assert!(store.raw().is_some());
    }

    #[test]
    fn upload_replaces_only_the_image() {
        let (mut core, _) = new_core();

        let cycle = core.begin_upload(Some("blob:local/42".to_string())).unwrap();
        assert_eq!(core.phase(), Phase::Uploading);
        assert!(core.begin_analysis(cycle));
        let entry = core.complete_analysis(cycle, Utc::now()).unwrap();

        assert_eq!(entry.result, catalog::pick(0).with_image("blob:local/42"));
    }

    #[test]
    fn upload_without_image_is_ignored() {
        let (mut core, _) = new_core();
        assert!(core.begin_upload(None).is_none());
        assert!(core.begin_upload(Some("  ".to_string())).is_none());
        assert_eq!(core.phase(), Phase::Idle);
    }

    #[test]
    fn starting_while_busy_is_ignored() {
        let (mut core, _) = new_core();
        core.begin_camera_scan().unwrap();

        assert!(core.begin_camera_scan().is_none());
        assert!(core.begin_upload(Some("img".to_string())).is_none());
        assert_eq!(core.phase(), Phase::Scanning);
    }

    #[test]
    fn reset_from_result_keeps_cursor_and_history() {
        let (mut core, _) = new_core();
        let cycle = core.begin_camera_scan().unwrap();
        core.begin_analysis(cycle);
        core.complete_analysis(cycle, Utc::now());

        core.reset();

        assert_eq!(core.phase(), Phase::Idle);
        assert!(core.current_result().is_none());
        assert_eq!(core.cursor(), 1);
        assert_eq!(core.history().len(), 1);
    }

    #[test]
    fn callbacks_from_an_abandoned_cycle_do_nothing() {
        let (mut core, _) = new_core();
        let stale = core.begin_camera_scan().unwrap();
        core.reset();

        assert!(!core.begin_analysis(stale));
        assert!(core.complete_analysis(stale, Utc::now()).is_none());
        assert_eq!(core.phase(), Phase::Idle);

        let fresh = core.begin_camera_scan().unwrap();
        assert!(!core.begin_analysis(stale));
        assert_eq!(core.phase(), Phase::Scanning);
        assert!(core.begin_analysis(fresh));
    }

    #[test]
    fn complete_requires_analyzing() {
        let (mut core, _) = new_core();
        let cycle = core.begin_camera_scan().unwrap();
        assert!(core.complete_analysis(cycle, Utc::now()).is_none());
        assert_eq!(core.cursor(), 0);
    }

    #[test]
    fn sixth_cycle_repeats_the_first() {
        let (mut core, _) = new_core();
        let entries: Vec<_> = (0..6).map(|_| full_cycle(&mut core)).collect();

        assert_eq!(entries[5].result, entries[0].result);
        assert_eq!(core.cursor(), 6);
    }

    #[test]
    fn history_is_bounded_and_newest_first() {
        let (mut core, _) = new_core();
        let entries: Vec<_> = (0..11).map(|_| full_cycle(&mut core)).collect();

        assert_eq!(core.history().len(), HISTORY_LIMIT);
        assert_eq!(core.history().newest(), entries.last());
        assert!(!core.history().entries().contains(&entries[0]));

        let ids: Vec<_> = core.history().entries().iter().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn clear_history_keeps_state() {
        let (mut core, store) = new_core();
        let cycle = core.begin_camera_scan().unwrap();
        core.begin_analysis(cycle);
        core.complete_analysis(cycle, Utc::now());

        core.clear_history();

        assert!(core.history().is_empty());
        assert!(store.raw().is_none());
        assert_eq!(core.phase(), Phase::Result);
        assert_eq!(core.cursor(), 1);
    }

    #[test]
    fn persisted_history_is_loaded_on_start() {
        let (mut first, store) = new_core();
        let entry = full_cycle(&mut first);

        let second = SessionCore::new(store);
        assert_eq!(second.history().entries(), &[entry]);
        assert_eq!(second.cursor(), 0);
    }
}
