//! Per-board session - the object that owns all mutable coordination state.
//!
//! One `BoardSession` is created when a board's editing surface mounts and
//! dropped when it unmounts. Load state, save flags, the last-known-good
//! record set and the watchdog handle all live here rather than in
//! process-wide globals, so two open boards can never bleed into each other.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::backend::DocumentBackend;
use crate::loader::{self, LoadState};
use crate::record::{BoardId, DrawableRecord};
use crate::saver::{self, SaveOutcome};
use crate::store::{ChangeListener, RecordStore, Unsubscribe};
use crate::watchdog;

/// Tunable intervals for a board session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between store attachment and the first container-id read,
    /// giving the editing surface a tick to finish its own setup
    pub settle_delay: Duration,
    /// Minimum interval between successful saves
    pub min_save_interval: Duration,
    /// Cadence of the integrity watchdog
    pub watchdog_interval: Duration,
    /// Window after a core-initiated bulk insert during which store change
    /// notifications are not treated as user edits
    pub change_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
            min_save_interval: Duration::from_secs(1),
            watchdog_interval: Duration::from_secs(2),
            change_grace: Duration::from_millis(500),
        }
    }
}

/// All mutable per-session state, behind one mutex.
///
/// Plain flags and timestamps, never held across an await - the runtime model
/// has no true parallel mutation to defend against, only interleaving.
pub(crate) struct SessionState {
    pub(crate) load_state: LoadState,
    pub(crate) save_in_flight: bool,
    pub(crate) last_save_at: Option<Instant>,
    pub(crate) last_known_good: Option<Vec<DrawableRecord>>,
    pub(crate) dirty: bool,
    pub(crate) suppress_changes_until: Option<Instant>,
    pub(crate) store: Option<Arc<dyn RecordStore>>,
    unsubscribe: Option<Unsubscribe>,
    watchdog: Option<JoinHandle<()>>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            load_state: LoadState::NotLoaded,
            save_in_flight: false,
            last_save_at: None,
            last_known_good: None,
            dirty: false,
            suppress_changes_until: None,
            store: None,
            unsubscribe: None,
            watchdog: None,
        }
    }
}

/// Shared session internals, one `Arc` handed to every flow that needs it
pub(crate) struct SessionInner {
    pub(crate) board_id: BoardId,
    pub(crate) backend: Arc<dyn DocumentBackend>,
    pub(crate) config: SessionConfig,
    pub(crate) state: Mutex<SessionState>,
}

impl SessionInner {
    pub(crate) fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that the live store changed.
    ///
    /// Changes inside the suppression window (the loader's own insert, a
    /// watchdog heal) are not user edits and must not flag a pending save.
    pub(crate) fn note_store_change(&self) {
        let mut state = self.state();
        if let Some(deadline) = state.suppress_changes_until {
            if Instant::now() < deadline {
                return;
            }
            state.suppress_changes_until = None;
        }
        if state.load_state == LoadState::Loading {
            return;
        }
        state.dirty = true;
    }

    /// Open the suppression window ahead of a core-initiated bulk insert
    pub(crate) fn begin_change_grace(&self) {
        let deadline = Instant::now() + self.config.change_grace;
        self.state().suppress_changes_until = Some(deadline);
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = state.watchdog.take() {
            handle.abort();
        }
        if let Some(unsubscribe) = state.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// Synchronization session for one board.
pub struct BoardSession {
    pub(crate) inner: Arc<SessionInner>,
}

impl BoardSession {
    /// Create a session with default intervals
    pub fn new(board_id: BoardId, backend: Arc<dyn DocumentBackend>) -> Self {
        Self::with_config(board_id, backend, SessionConfig::default())
    }

    pub fn with_config(
        board_id: BoardId,
        backend: Arc<dyn DocumentBackend>,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                board_id,
                backend,
                config,
                state: Mutex::new(SessionState::new()),
            }),
        }
    }

    pub fn board_id(&self) -> BoardId {
        self.inner.board_id
    }

    /// Attach to a freshly created live store and hydrate it from the
    /// persisted payload. Safe to call repeatedly; only the first call on a
    /// session performs the load.
    pub async fn attach_loader(&self, store: Arc<dyn RecordStore>) -> Result<()> {
        self.install_subscription(&store);
        loader::load_into(&self.inner, &store).await
    }

    /// Explicit user-triggered save of the current store contents.
    ///
    /// Safe to call repeatedly: an in-flight save or a trigger inside the
    /// minimum interval is skipped, not an error.
    pub async fn trigger_save(&self) -> Result<SaveOutcome> {
        let store = self
            .inner
            .state()
            .store
            .clone()
            .ok_or_else(|| anyhow!("no record store attached to session"))?;
        saver::save_from(&self.inner, &store).await
    }

    /// Start the integrity watchdog over the given store
    pub fn start_watchdog(&self, store: Arc<dyn RecordStore>) {
        let mut state = self.inner.state();
        if state.watchdog.is_some() {
            debug!(board = %self.inner.board_id, "watchdog already running");
            return;
        }
        state.watchdog = Some(watchdog::spawn_watchdog(&self.inner, store));
    }

    /// Stop the integrity watchdog
    pub fn stop_watchdog(&self) {
        if let Some(handle) = self.inner.state().watchdog.take() {
            handle.abort();
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.state().load_state
    }

    /// Whether the store has user edits not yet persisted
    pub fn is_dirty(&self) -> bool {
        self.inner.state().dirty
    }

    fn install_subscription(&self, store: &Arc<dyn RecordStore>) {
        let mut state = self.inner.state();
        if state.unsubscribe.is_some() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let listener: ChangeListener = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.note_store_change();
            }
        });
        state.unsubscribe = Some(store.subscribe(listener));
        state.store = Some(Arc::clone(store));
    }
}
