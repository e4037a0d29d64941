//! Canvas document synchronization core for the Slateboard whiteboard.
//!
//! The dashboard around this crate is thin CRUD glue; the part with real
//! correctness hazards is keeping the editing surface's in-memory record
//! store and the remote document service consistent. This crate owns that:
//!
//! - load a persisted board into the live store exactly once per session,
//!   re-parenting every record onto the container the store actually uses
//! - serialize the store back into a payload on explicit user request,
//!   guarded against double-submission and overlapping writes
//! - watch for the store being wiped out from under the session and restore
//!   the last known-good record set
//!
//! The editing surface and the remote service stay behind the [`RecordStore`]
//! and [`DocumentBackend`] traits; this crate implements neither.

pub mod backend;
pub mod codec;
mod loader;
pub mod record;
mod saver;
pub mod session;
pub mod store;
mod watchdog;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::DocumentBackend;
pub use loader::LoadState;
pub use record::{
    BoardId, ContainerId, DocumentPayload, DrawableRecord, Geometry, RecordId, RecordKind,
    ShapeStyle,
};
pub use saver::SaveOutcome;
pub use session::{BoardSession, SessionConfig};
pub use store::{ChangeListener, RecordStore, Unsubscribe};
