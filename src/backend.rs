//! The persistence backend boundary.
//!
//! A remote key-value document service storing one opaque payload per board.
//! Timeouts, retries and the remote updated-timestamp are the backend's
//! contract; the core awaits one fetch per load and one write per save.

use anyhow::Result;
use async_trait::async_trait;

use crate::record::{BoardId, DocumentPayload};

/// Remote document service, used as `Arc<dyn DocumentBackend>`.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Fetch the persisted payload for a board.
    ///
    /// Returns `None` for a board that has never been saved.
    async fn fetch_document_payload(&self, board: BoardId) -> Result<Option<DocumentPayload>>;

    /// Persist the payload for a board, refreshing the remote
    /// updated-timestamp.
    async fn write_document_payload(&self, board: BoardId, payload: &DocumentPayload)
    -> Result<()>;
}
