//! Outliner panel state: the current tree, its reconciler and the selection.

use void_scene::{ObjectHandle, Scene};

use crate::tree::{
    GraphTree, NodeKey, SelectionManager, SelectionMode, SiblingDirection, TreeReconciler,
};

/// UI state of the scene outliner.
#[derive(Debug, Default)]
pub struct Outliner {
    tree: GraphTree,
    reconciler: TreeReconciler,
    selection: SelectionManager,
    /// Whether the panel needs a redraw
    dirty: bool,
    refresh_count: u64,
}

impl Outliner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match the text filter case-sensitively.
    pub fn with_case_sensitive_filter(mut self, case_sensitive: bool) -> Self {
        self.reconciler = self.reconciler.with_case_sensitive(case_sensitive);
        self
    }

    /// Tree built by the last refresh.
    pub fn tree(&self) -> &GraphTree {
        &self.tree
    }

    /// Current row selection.
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Active text filter, empty when unfiltered.
    pub fn filter(&self) -> &str {
        self.reconciler.filter()
    }

    /// Number of reconciliation passes run so far.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Re-walk the scene and rebuild the tree.
    pub fn refresh(&mut self, scene: &mut Scene) {
        let previous = std::mem::take(&mut self.tree);
        self.tree = self.reconciler.refresh(scene, &previous);
        self.selection.sync_from_tree(&mut self.tree);
        self.refresh_count += 1;
        self.dirty = true;
    }

    /// Request a redraw without re-walking the scene.
    pub fn update(&mut self) {
        self.dirty = true;
    }

    /// Check and clear the redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        let was_dirty = self.dirty | self.selection.take_dirty();
        self.dirty = false;
        was_dirty
    }

    /// Change the text filter and refresh.
    pub fn set_filter(&mut self, scene: &mut Scene, filter: impl Into<String>) {
        self.reconciler.set_filter(filter);
        self.refresh(scene);
    }

    /// Handle a row click with the modifier keys held.
    pub fn click_node(&mut self, key: NodeKey, shift: bool, ctrl_or_meta: bool) {
        let mode = SelectionMode::from_modifiers(shift, ctrl_or_meta, !self.selection.is_empty());
        self.click_node_with_mode(key, mode);
    }

    /// Handle a row click with an explicit selection mode.
    pub fn click_node_with_mode(&mut self, key: NodeKey, mode: SelectionMode) {
        self.selection.click_node(&mut self.tree, key, mode);
    }

    /// Expand one row.
    pub fn expand(&mut self, key: NodeKey) {
        self.selection.expand(&mut self.tree, key);
    }

    /// Collapse one row.
    pub fn collapse(&mut self, key: NodeKey) {
        self.selection.collapse(&mut self.tree, key);
    }

    /// Flip one row's expansion.
    pub fn toggle_expanded(&mut self, key: NodeKey) {
        self.selection.toggle_expanded(&mut self.tree, key);
    }

    /// Move the selection to the previous or next sibling row.
    pub fn go_to_sibling(&mut self, direction: SiblingDirection) -> bool {
        self.selection.go_to_sibling(&mut self.tree, direction)
    }

    /// Expand or collapse the last selected row.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        self.selection.set_expanded(&mut self.tree, expanded)
    }

    /// Select an object from outside the panel, expanding its ancestors.
    pub fn set_selected(&mut self, object: ObjectHandle, append: bool) -> bool {
        self.selection
            .set_selected(&mut self.tree, NodeKey::Object(object), append)
    }

    /// Append an object to the selection.
    pub fn add_to_selected(&mut self, object: ObjectHandle) -> bool {
        self.set_selected(object, true)
    }

    /// Deselect every row.
    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.tree);
    }

    /// Selected objects in selection order.
    pub fn selected_objects(&self) -> Vec<ObjectHandle> {
        self.selection.selected_objects()
    }

    /// Most recently selected object.
    pub fn last_selected_object(&self) -> Option<ObjectHandle> {
        self.selection.last().and_then(NodeKey::object)
    }

    /// Whether the object's row is selected.
    pub fn is_object_selected(&self, object: ObjectHandle) -> bool {
        self.selection.is_selected(NodeKey::Object(object))
    }
}
