//! Error types for the outliner.

use thiserror::Error;
use void_scene::ObjectHandle;

use crate::classify::NodeKind;

/// Errors surfaced at the edges of the outliner API.
///
/// Reconciliation, selection and history operations never fail; they skip
/// what they cannot handle.
#[derive(Debug, Error)]
pub enum OutlinerError {
    /// Handle does not refer to a live object
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectHandle),

    /// Clone requested for a kind that has no structural copy
    #[error("Objects of kind {kind:?} cannot be cloned")]
    NotCloneable { kind: NodeKind },

    /// Drag payload could not be decoded
    #[error("Invalid drag payload: {0}")]
    InvalidDragPayload(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse preferences: {0}")]
    PreferencesParse(#[from] toml::de::Error),

    #[error("Failed to serialize preferences: {0}")]
    PreferencesSerialize(#[from] toml::ser::Error),
}

/// Result type for outliner operations
pub type Result<T> = std::result::Result<T, OutlinerError>;
