//! The live record store boundary.
//!
//! The editing surface owns an in-memory store of drawable records; this core
//! only consumes it. Everything the coordinators need from it is bulk reads,
//! bulk writes, the currently active container id, and a change
//! subscription.

use std::sync::Arc;

use crate::record::{ContainerId, DrawableRecord, RecordId};

/// Callback invoked by the store after any change to its records
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

/// Closure that removes a previously installed change listener
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

/// In-memory record store owned by the editing surface.
///
/// Used as `Arc<dyn RecordStore>`. Methods are synchronous - the store lives
/// in memory next to the canvas; only the persistence backend suspends.
pub trait RecordStore: Send + Sync {
    /// The container id that is actually current in the store right now.
    ///
    /// Must be read fresh for every decode - assuming a default or cached id
    /// is the invisible-record failure mode.
    fn current_container_id(&self) -> ContainerId;

    /// Snapshot of every record currently in the store
    fn all_records(&self) -> Vec<DrawableRecord>;

    /// Insert records in bulk
    fn bulk_insert(&self, records: Vec<DrawableRecord>);

    /// Delete records by id in bulk
    fn bulk_delete(&self, ids: &[RecordId]);

    /// Install a change listener, invoked after every mutation
    fn subscribe(&self, on_change: ChangeListener) -> Unsubscribe;
}
