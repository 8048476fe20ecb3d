//! Outliner selection with click modifiers and keyboard navigation.
//!
//! - Click: replace selection
//! - Shift+Click: select the flattened range from the first selected row
//! - Ctrl/Cmd+Click: toggle the clicked row
//!
//! Keyboard navigation and expansion shortcuts act on the last selected row.

use void_scene::ObjectHandle;

use super::{GraphTree, NodeKey};

/// Selection mode derived from the modifier keys of a click.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace current selection (normal click)
    #[default]
    Replace,
    /// Select the range from the first selected row (Shift+click)
    Range,
    /// Toggle the clicked row (Ctrl/Cmd+click)
    Toggle,
}

impl SelectionMode {
    /// Determine selection mode from modifier keys. Shift only selects a
    /// range when there is something to anchor it to.
    pub fn from_modifiers(shift: bool, ctrl_or_meta: bool, has_selection: bool) -> Self {
        match (shift && has_selection, ctrl_or_meta) {
            (true, _) => Self::Range,
            (false, true) => Self::Toggle,
            (false, false) => Self::Replace,
        }
    }
}

/// Direction for keyboard sibling navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiblingDirection {
    Next,
    Previous,
}

/// Ordered selection over the rows of a [`GraphTree`].
#[derive(Clone, Debug, Default)]
pub struct SelectionManager {
    /// Selected rows, in selection order
    selected: Vec<NodeKey>,
    /// Whether selection has changed since last frame
    dirty: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected rows in selection order.
    pub fn selected(&self) -> &[NodeKey] {
        &self.selected
    }

    /// Anchor of range selection.
    pub fn first(&self) -> Option<NodeKey> {
        self.selected.first().copied()
    }

    /// Anchor of keyboard navigation.
    pub fn last(&self) -> Option<NodeKey> {
        self.selected.last().copied()
    }

    /// Number of selected rows.
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether the row is selected.
    pub fn is_selected(&self, key: NodeKey) -> bool {
        self.selected.contains(&key)
    }

    /// Selected scene objects in selection order. Pseudo-roots are skipped.
    pub fn selected_objects(&self) -> Vec<ObjectHandle> {
        self.selected.iter().filter_map(|k| k.object()).collect()
    }

    /// Check and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    /// Handle a click on a row. Clicks on rows absent from the tree and
    /// range clicks without a resolvable anchor are ignored.
    pub fn click_node(&mut self, tree: &mut GraphTree, key: NodeKey, mode: SelectionMode) {
        if !tree.contains(key) {
            return;
        }

        match mode {
            SelectionMode::Replace => {
                self.selected.clear();
                self.selected.push(key);
            }
            SelectionMode::Range => {
                if !self.select_range(tree, key) {
                    return;
                }
            }
            SelectionMode::Toggle => {
                if self.selected.contains(&key) {
                    self.selected.retain(|&k| k != key);
                } else {
                    self.selected.push(key);
                }
            }
        }

        self.sync_flags(tree);
        self.dirty = true;
    }

    fn select_range(&mut self, tree: &GraphTree, key: NodeKey) -> bool {
        let Some(anchor) = self.first() else {
            return false;
        };
        let keys = tree.flattened_keys();
        let (Some(a), Some(b)) = (
            keys.iter().position(|&k| k == anchor),
            keys.iter().position(|&k| k == key),
        ) else {
            return false;
        };

        let min = a.min(b).max(tree.fixed_prefix_len());
        let max = a.max(b);
        self.selected = if min <= max {
            keys[min..=max].to_vec()
        } else {
            Vec::new()
        };
        true
    }

    /// Set `is_expanded` on one row. Selection is untouched.
    pub fn expand(&mut self, tree: &mut GraphTree, key: NodeKey) {
        self.set_row_expanded(tree, key, true);
    }

    /// Clear `is_expanded` on one row.
    pub fn collapse(&mut self, tree: &mut GraphTree, key: NodeKey) {
        self.set_row_expanded(tree, key, false);
    }

    /// Flip `is_expanded` on one row.
    pub fn toggle_expanded(&mut self, tree: &mut GraphTree, key: NodeKey) {
        if let Some(node) = tree.find_mut(key) {
            node.is_expanded = !node.is_expanded;
            self.dirty = true;
        }
    }

    fn set_row_expanded(&mut self, tree: &mut GraphTree, key: NodeKey, expanded: bool) -> bool {
        match tree.find_mut(key) {
            Some(node) => {
                node.is_expanded = expanded;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Expand or collapse the last selected row.
    pub fn set_expanded(&mut self, tree: &mut GraphTree, expanded: bool) -> bool {
        match self.last() {
            Some(key) => self.set_row_expanded(tree, key, expanded),
            None => false,
        }
    }

    /// Move the selection from the last selected row to a sibling row.
    /// Only rows of node kinds take part. Returns whether the selection moved.
    pub fn go_to_sibling(&mut self, tree: &mut GraphTree, direction: SiblingDirection) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        if !tree.find(last).is_some_and(|n| n.kind.is_node()) {
            return false;
        }

        let target = match direction {
            SiblingDirection::Next => next_node_sibling(tree, last),
            SiblingDirection::Previous => previous_node_sibling(tree, last),
        };
        let Some(target) = target else {
            return false;
        };

        self.selected.clear();
        self.selected.push(target);
        self.sync_flags(tree);
        self.dirty = true;
        true
    }

    /// Programmatic selection, e.g. from a viewport pick. Every ancestor row
    /// of the object is expanded so it becomes visible.
    pub fn set_selected(&mut self, tree: &mut GraphTree, key: NodeKey, append: bool) -> bool {
        if !tree.contains(key) {
            return false;
        }

        for ancestor in tree.ancestors_of(key) {
            if let Some(node) = tree.find_mut(ancestor) {
                node.is_expanded = true;
            }
        }

        if append {
            if !self.selected.contains(&key) {
                self.selected.push(key);
            }
        } else {
            self.selected.clear();
            self.selected.push(key);
        }

        self.sync_flags(tree);
        self.dirty = true;
        true
    }

    /// Deselect every row.
    pub fn clear(&mut self, tree: &mut GraphTree) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.dirty = true;
        }
        self.sync_flags(tree);
    }

    /// Rebuild the selection after a reconciliation pass. Rows that no
    /// longer exist are dropped, the previous order is kept.
    pub fn sync_from_tree(&mut self, tree: &mut GraphTree) {
        let flagged = tree.selected_keys();
        let before = self.selected.len();

        self.selected.retain(|k| flagged.contains(k));
        for key in flagged {
            if !self.selected.contains(&key) {
                self.selected.push(key);
            }
        }

        if self.selected.len() != before {
            self.dirty = true;
        }
        self.sync_flags(tree);
    }

    /// Make `is_selected` match the selection exactly.
    fn sync_flags(&self, tree: &mut GraphTree) {
        let selected = &self.selected;
        tree.for_each_mut(|n| n.is_selected = selected.contains(&n.key));
    }
}

/// Next node-kind sibling, climbing to the parent's siblings at the end of
/// a list.
fn next_node_sibling(tree: &GraphTree, key: NodeKey) -> Option<NodeKey> {
    let siblings: Vec<NodeKey> = tree
        .siblings_of(key)?
        .iter()
        .filter(|n| n.kind.is_node())
        .map(|n| n.key)
        .collect();
    let index = siblings.iter().position(|&k| k == key)?;

    if let Some(&next) = siblings.get(index + 1) {
        return Some(next);
    }

    match tree.parent_of(key) {
        Some(parent) if parent.kind.is_node() => next_node_sibling(tree, parent.key),
        _ => None,
    }
}

/// Previous node-kind sibling, or the parent row at the start of a list.
fn previous_node_sibling(tree: &GraphTree, key: NodeKey) -> Option<NodeKey> {
    let siblings: Vec<NodeKey> = tree
        .siblings_of(key)?
        .iter()
        .filter(|n| n.kind.is_node())
        .map(|n| n.key)
        .collect();
    let index = siblings.iter().position(|&k| k == key)?;

    if index > 0 {
        return Some(siblings[index - 1]);
    }

    match tree.parent_of(key) {
        Some(parent) if parent.kind.is_node() => Some(parent.key),
        _ => None,
    }
}
