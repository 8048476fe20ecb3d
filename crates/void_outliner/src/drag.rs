//! Drag and drop envelope for outliner rows.

use serde::{Deserialize, Serialize};
use void_scene::{ObjectHandle, Scene};

use crate::error::{OutlinerError, Result};
use crate::ids::find_by_id;

/// Data type the payload is registered under.
pub const DRAG_DATA_TYPE: &str = "graph/node";

/// Rows being dragged: the grabbed row and every co-selected row, by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub node_id: String,
    #[serde(default)]
    pub all_node_ids: Vec<String>,
}

impl DragPayload {
    pub fn new(node_id: impl Into<String>, all_node_ids: Vec<String>) -> Self {
        Self {
            node_id: node_id.into(),
            all_node_ids,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a dropped payload. Only a JSON object is accepted; serde would
    /// otherwise read a bare array positionally.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(OutlinerError::InvalidDragPayload(
                serde::de::Error::custom("drag payload must be a JSON object"),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Live objects named by the payload. The grabbed row is always part of
    /// the result; ids that no longer resolve are dropped.
    pub fn resolve(&self, scene: &Scene) -> Vec<ObjectHandle> {
        let mut objects = Vec::new();
        let ids = self
            .all_node_ids
            .iter()
            .chain(std::iter::once(&self.node_id));
        for id in ids {
            if let Some(object) = find_by_id(scene, id) {
                if !objects.contains(&object) {
                    objects.push(object);
                }
            }
        }
        objects
    }
}
