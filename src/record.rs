//! Record and payload types for the board document.
//!
//! A board is a flat set of drawable records keyed by id. Persisted form is a
//! JSON mapping of id to record-shaped value (the Document Payload); live form
//! is whatever the editing surface's record store holds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a board (key in the persistence backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardId(pub Uuid);

impl BoardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BoardId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BoardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record identifier - opaque string, stable across load/save cycles.
///
/// Persisted payloads own these ids ("r1", "shape:tx4f..."), so unlike board
/// ids they are not generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the page container a record belongs to.
///
/// A record only renders if its `parent_ref` resolves to a container that
/// exists in the live store, and container ids are not stable across
/// sessions - see [`crate::codec::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind discriminator for record-shaped values.
///
/// Persisted payloads may carry non-drawable entries (document metadata,
/// foreign kinds); those deserialize as `Unknown` and get filtered on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Shape,
    #[serde(other)]
    Unknown,
}

/// Position, rotation and size of a record.
///
/// Rotation and size default to zero when absent from persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Kind-specific style payload (color, text content)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A single drawable record - the unit the live record store holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawableRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    /// Must resolve to a container that exists in the live store at insert
    /// time, otherwise the rendering layer silently drops the record.
    pub parent_ref: ContainerId,
    pub geometry: Geometry,
    #[serde(default)]
    pub style: ShapeStyle,
    /// Free-form metadata, not interpreted by the core
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub auxiliary: Value,
}

impl DrawableRecord {
    /// Create a shape record at the given position
    pub fn shape(id: RecordId, parent_ref: ContainerId, geometry: Geometry) -> Self {
        Self {
            id,
            kind: RecordKind::Shape,
            parent_ref,
            geometry,
            style: ShapeStyle::default(),
            auxiliary: Value::Null,
        }
    }
}

/// The persisted form of a board: a mapping from record id to record-shaped
/// value, stored as one opaque JSON document per board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPayload(pub BTreeMap<String, Value>);

impl DocumentPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.0.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}
