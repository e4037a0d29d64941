//! Load coordinator - at-most-once hydration of the live store.
//!
//! A board's persisted payload is applied to the record store exactly once
//! per session. Everything after the first successful pass is a no-op, and a
//! fetch failure degrades to an empty board rather than an error dialog.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::codec;
use crate::record::RecordId;
use crate::session::SessionInner;
use crate::store::RecordStore;

/// Hydration progress for a board session. Forward-only: once `Loaded` is
/// reached it stays `Loaded` for the lifetime of the store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

/// Run the load flow for a session against its freshly mounted store.
pub(crate) async fn load_into(
    inner: &Arc<SessionInner>,
    store: &Arc<dyn RecordStore>,
) -> Result<()> {
    {
        let mut state = inner.state();
        if state.load_state != LoadState::NotLoaded {
            debug!(board = %inner.board_id, state = ?state.load_state, "load already ran; ignoring");
            return Ok(());
        }
        state.load_state = LoadState::Loading;
    }

    // Fetched once per board open; the core never re-fetches.
    let payload = match inner.backend.fetch_document_payload(inner.board_id).await {
        Ok(payload) => payload,
        Err(err) => {
            warn!(board = %inner.board_id, %err, "payload fetch failed; presenting an empty board");
            None
        }
    };

    let Some(payload) = payload.filter(|payload| !payload.is_empty()) else {
        // An empty board is a valid terminal state, not an error.
        inner.state().load_state = LoadState::Loaded;
        debug!(board = %inner.board_id, "no persisted payload");
        return Ok(());
    };

    // The editing surface may need a tick after mount before its container id
    // is queryable.
    tokio::time::sleep(inner.config.settle_delay).await;

    // Read fresh from the store - a cached or hardcoded container id is how
    // records go invisible.
    let container = store.current_container_id();
    let records = codec::decode(&payload, &container);

    if records.is_empty() {
        inner.state().load_state = LoadState::Loaded;
        debug!(board = %inner.board_id, "payload decoded to zero records");
        return Ok(());
    }

    // Clear whatever the store already holds, unless a good set was already
    // confirmed this session - a second pass must not destroy a healthy
    // store.
    let confirmed = inner.state().last_known_good.is_some();
    if !confirmed {
        let stale: Vec<RecordId> = store.all_records().into_iter().map(|r| r.id).collect();
        if !stale.is_empty() {
            debug!(board = %inner.board_id, count = stale.len(), "clearing pre-existing records");
            store.bulk_delete(&stale);
        }
    }

    let count = records.len();
    inner.begin_change_grace();
    store.bulk_insert(records.clone());

    {
        let mut state = inner.state();
        state.last_known_good = Some(records);
        state.load_state = LoadState::Loaded;
        state.dirty = false;
    }

    info!(board = %inner.board_id, container = %container, count, "board loaded");
    Ok(())
}
