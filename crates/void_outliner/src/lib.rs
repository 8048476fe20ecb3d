//! Void Engine Scene Outliner
//!
//! The hierarchy panel of the editor: a UI tree projected from the live
//! scene, the selection on top of it, and the undoable structural edits
//! that go through it.
//!
//! ## Features
//!
//! - **Tree Reconciler**: Rebuilds the tree on every refresh, keeping row
//!   selection and expansion by object identity
//! - **Selection**: Replace, toggle and shift-range clicks, keyboard sibling
//!   navigation
//! - **Undo/Redo**: Linear, bounded command history with transactions and
//!   scoped purging
//! - **Structural Edits**: Move (keep-world optional), remove with restorable
//!   side effects, clone, rename, paste transform, lock and export flags
//! - **Drag and Drop**: JSON payload carrying every dragged row's id
//!
//! ## Architecture
//!
//! ```text
//! User Input → OutlinerSession → commands → Scene
//!                              ↘ CommandStack (undo/redo closures)
//! Scene → TreeReconciler → GraphTree → SelectionManager
//! ```
//!
//! Every edit mutates the scene first, then records an undo/redo pair whose
//! shared side effect refreshes the outliner.

pub mod classify;
pub mod commands;
pub mod drag;
pub mod error;
pub mod history;
pub mod ids;
pub mod outliner;
pub mod preferences;
pub mod session;
pub mod tree;

// Re-export commonly used types
pub use classify::{classify, NodeKind};
pub use commands::{TransformPart, TransformSnapshot};
pub use drag::{DragPayload, DRAG_DATA_TYPE};
pub use error::{OutlinerError, Result};
pub use history::{CommandEntry, CommandStack, Transaction};
pub use outliner::Outliner;
pub use preferences::OutlinerPreferences;
pub use session::{EditorContext, OutlinerSession};
pub use tree::{
    GraphNode, GraphTree, NodeKey, PseudoRoot, SelectionManager, SelectionMode, SiblingDirection,
    TreeReconciler,
};
