//! Async driver around `SessionCore`.
//!
//! Each scan cycle runs as one tokio task that sleeps through the simulated
//! delays and feeds the core. Starting over, resetting or dropping the
//! session aborts that task. Phase changes are published on a watch channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::info;

use super::machine::{CycleId, Phase, SessionCore, SessionState};
use crate::config::SessionConfig;
use crate::scan::HistoryEntry;
use crate::store::HistoryStore;

struct Shared<S> {
    core: Mutex<SessionCore<S>>,
    config: SessionConfig,
    phase_tx: watch::Sender<Phase>,
}

impl<S: HistoryStore> Shared<S> {
    fn core(&self) -> MutexGuard<'_, SessionCore<S>> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, phase: Phase) {
        self.phase_tx.send_replace(phase);
    }
}

/// Scan session driven by timers on the tokio runtime.
///
/// Each cycle runs as one spawned task (first delay, analyzing, second
/// delay, result). At most one such task exists: starting a cycle or
/// resetting aborts the previous one, and dropping the session aborts
/// whatever is still pending. Must be used from within a tokio runtime.
pub struct ScanSession<S: HistoryStore> {
    shared: Arc<Shared<S>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<S: HistoryStore> ScanSession<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Idle);

        ScanSession {
            shared: Arc::new(Shared {
                core: Mutex::new(SessionCore::new(store)),
                config,
                phase_tx,
            }),
            pending: Mutex::new(None),
        }
    }

    /// Returns false, changing nothing, unless the session is idle.
    pub fn start_camera_scan(&self) -> bool {
        let cycle = {
            let mut core = self.shared.core();
            let cycle = core.begin_camera_scan();
            if cycle.is_some() {
                self.shared.publish(Phase::Scanning);
            }
            cycle
        };

        match cycle {
            Some(cycle) => {
                self.schedule(cycle, self.shared.config.scan_delay);
                true
            }
            None => false,
        }
    }

    /// Returns false, changing nothing, unless the session is idle and an
    /// image reference was supplied.
    pub fn start_upload(&self, image: Option<String>) -> bool {
        let cycle = {
            let mut core = self.shared.core();
            let cycle = core.begin_upload(image);
            if cycle.is_some() {
                self.shared.publish(Phase::Uploading);
            }
            cycle
        };

        match cycle {
            Some(cycle) => {
                self.schedule(cycle, self.shared.config.upload_delay);
                true
            }
            None => false,
        }
    }

    pub fn reset(&self) {
        self.cancel_pending();

        let mut core = self.shared.core();
        core.reset();
        self.shared.publish(Phase::Idle);
    }

    pub fn clear_history(&self) {
        self.shared.core().clear_history();
    }

    /// Phase changes as they happen. The receiver starts out holding the
    /// current phase.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.shared.phase_tx.subscribe()
    }

    /// Waits until the session shows a result and returns it.
    pub async fn wait_for_result(&self) -> Option<HistoryEntry> {
        let mut phases = self.subscribe();
        if phases.wait_for(|phase| *phase == Phase::Result).await.is_err() {
            return None;
        }

        self.current_result()
    }

    pub fn phase(&self) -> Phase {
        self.shared.core().phase()
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.core().state().clone()
    }

    pub fn current_result(&self) -> Option<HistoryEntry> {
        self.shared.core().current_result().cloned()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.shared.core().history().entries().to_vec()
    }

    pub fn cursor(&self) -> usize {
        self.shared.core().cursor()
    }

    fn schedule(&self, cycle: CycleId, first_delay: Duration) {
        self.cancel_pending();

        let task = tokio::spawn(run_cycle(self.shared.clone(), cycle, first_delay));
        *self.pending() = Some(task);
    }

    fn cancel_pending(&self) {
        if let Some(task) = self.pending().take() {
            task.abort();
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: HistoryStore> Drop for ScanSession<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

async fn run_cycle<S: HistoryStore>(shared: Arc<Shared<S>>, cycle: CycleId, first_delay: Duration) {
    sleep(first_delay).await;

    {
        let mut core = shared.core();
        if !core.begin_analysis(cycle) {
            return;
        }
        shared.publish(Phase::Analyzing);
    }

    sleep(shared.config.analyze_delay).await;

    let mut core = shared.core();
    if let Some(entry) = core.complete_analysis(cycle, Utc::now()) {
        info!(
            product = %entry.result.product_name,
            risk = %entry.result.risk_level,
            "Scan complete"
        );
        shared.publish(Phase::Result);
    }
}
