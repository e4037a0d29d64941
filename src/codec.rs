//! Snapshot codec - pure conversion between the persisted Document Payload
//! and the drawable records the live store holds.
//!
//! The one non-obvious job here is the parent rewrite on decode: container
//! ids are not stable across sessions or environments, so a persisted
//! `parentRef` may point at a container the live store no longer has. A
//! record whose parent does not resolve is silently dropped by the rendering
//! layer, which reads as data loss to the user. Decode therefore discards the
//! persisted container id and re-parents every record onto the container the
//! live store reports as current.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::record::{
    ContainerId, DocumentPayload, DrawableRecord, Geometry, RecordId, RecordKind, ShapeStyle,
};

/// Record-shaped payload value, as persisted.
///
/// The mapping key is the authoritative record id and the persisted
/// `parentRef` gets rewritten wholesale, so neither is required here; a value
/// qualifies as a drawable record by carrying a shape kind and a geometry.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    kind: RecordKind,
    geometry: Geometry,
    #[serde(default)]
    style: ShapeStyle,
    #[serde(default)]
    auxiliary: Value,
}

/// Decode a persisted payload into records parented onto `live_container`.
///
/// Entries that are not record-shaped (document metadata, foreign kinds,
/// corrupt values) are skipped - a malformed payload degrades to fewer
/// records, never an error.
pub fn decode(payload: &DocumentPayload, live_container: &ContainerId) -> Vec<DrawableRecord> {
    let mut records = Vec::with_capacity(payload.len());

    for (id, value) in payload.iter() {
        let stored: StoredRecord = match serde_json::from_value(value.clone()) {
            Ok(stored) => stored,
            Err(err) => {
                debug!(%id, %err, "skipping non-record payload entry");
                continue;
            }
        };
        if stored.kind != RecordKind::Shape {
            debug!(%id, "skipping non-drawable payload entry");
            continue;
        }

        records.push(DrawableRecord {
            id: RecordId::new(id.clone()),
            kind: RecordKind::Shape,
            parent_ref: live_container.clone(),
            geometry: stored.geometry,
            style: stored.style,
            auxiliary: stored.auxiliary,
        });
    }

    records
}

/// Encode the full live record set into a persistable payload.
///
/// The kind discriminator is stamped into every value so the next decode can
/// filter drawable records from whatever else ends up in the payload.
pub fn encode(records: &[DrawableRecord]) -> DocumentPayload {
    let mut payload = DocumentPayload::new();

    for record in records {
        match serde_json::to_value(record) {
            Ok(value) => payload.insert(record.id.0.clone(), value),
            Err(err) => debug!(id = %record.id, %err, "skipping unserializable record"),
        }
    }

    payload
}
