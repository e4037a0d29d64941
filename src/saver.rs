//! Save coordinator - explicit, rate-limited export of the live store.
//!
//! Saves run only on user action; there is no auto-save. At most one save is
//! in flight at a time and successful saves are spaced by a minimum
//! interval, so double-submission collapses to a single backend write.

use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Result;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::codec;
use crate::session::SessionInner;
use crate::store::RecordStore;

/// Result of a save trigger.
///
/// Guard skips are outcomes, not errors - only a backend write failure
/// surfaces as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The payload was written
    Saved { saved_at: SystemTime },
    /// Another save is still in flight; this trigger was ignored
    AlreadyInFlight,
    /// The last successful save was too recent; this trigger was ignored
    Throttled,
}

/// Clears the in-flight flag on every exit path, including write failures.
struct InFlightGuard<'a> {
    inner: &'a SessionInner,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.inner.state().save_in_flight = false;
    }
}

/// Run the save flow for a session against its store.
pub(crate) async fn save_from(
    inner: &Arc<SessionInner>,
    store: &Arc<dyn RecordStore>,
) -> Result<SaveOutcome> {
    {
        let mut state = inner.state();
        if state.save_in_flight {
            debug!(board = %inner.board_id, "save already in flight; ignoring trigger");
            return Ok(SaveOutcome::AlreadyInFlight);
        }
        if let Some(last) = state.last_save_at {
            if last.elapsed() < inner.config.min_save_interval {
                debug!(board = %inner.board_id, "save throttled; ignoring trigger");
                return Ok(SaveOutcome::Throttled);
            }
        }
        state.save_in_flight = true;
    }
    let _guard = InFlightGuard { inner: inner.as_ref() };

    let records = store.all_records();
    let payload = codec::encode(&records);

    if let Err(err) = inner
        .backend
        .write_document_payload(inner.board_id, &payload)
        .await
    {
        // A failed save must not be trusted as authoritative; the previous
        // known-good set stands.
        warn!(board = %inner.board_id, %err, "payload write failed");
        return Err(err);
    }

    let saved_at = SystemTime::now();
    {
        let mut state = inner.state();
        state.last_known_good = Some(records);
        state.last_save_at = Some(Instant::now());
        state.dirty = false;
    }

    info!(board = %inner.board_id, count = payload.len(), "board saved");
    Ok(SaveOutcome::Saved { saved_at })
}
