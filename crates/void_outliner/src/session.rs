//! Editing session: the scene, its outliner and the undo history.
//!
//! State that the editor used to keep process-wide (the copied transform
//! source) lives here, so independent sessions never share it.

use void_scene::{ObjectHandle, Scene};

use crate::classify::classify;
use crate::commands::{self, TransformPart};
use crate::drag::DragPayload;
use crate::error::{OutlinerError, Result};
use crate::history::{CommandEntry, CommandStack};
use crate::ids::ensure_object_id;
use crate::outliner::Outliner;
use crate::preferences::OutlinerPreferences;
use crate::tree::{NodeKey, SiblingDirection};

/// What history closures operate on.
#[derive(Debug, Default)]
pub struct EditorContext {
    pub scene: Scene,
    pub outliner: Outliner,
}

impl EditorContext {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            outliner: Outliner::new(),
        }
    }

    /// Re-project the scene into the outliner.
    pub fn refresh(&mut self) {
        self.outliner.refresh(&mut self.scene);
    }
}

/// An editing session over one scene.
pub struct OutlinerSession {
    ctx: EditorContext,
    history: CommandStack<EditorContext>,
    /// Source of the next transform paste
    copied_transform: Option<ObjectHandle>,
    preferences: OutlinerPreferences,
}

impl OutlinerSession {
    pub fn new(scene: Scene) -> Self {
        Self::with_preferences(scene, OutlinerPreferences::default())
    }

    pub fn with_preferences(scene: Scene, preferences: OutlinerPreferences) -> Self {
        let mut ctx = EditorContext {
            scene,
            outliner: Outliner::new().with_case_sensitive_filter(preferences.case_sensitive_filter),
        };
        ctx.refresh();

        Self {
            ctx,
            history: CommandStack::with_capacity(preferences.history_size),
            copied_transform: None,
            preferences,
        }
    }

    /// Scene being edited.
    pub fn scene(&self) -> &Scene {
        &self.ctx.scene
    }

    /// Direct scene access. Call [`refresh`](Self::refresh) after structural
    /// changes made through it.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.ctx.scene
    }

    /// Outliner panel state.
    pub fn outliner(&self) -> &Outliner {
        &self.ctx.outliner
    }

    /// Mutable panel state, for expansion and clicks.
    pub fn outliner_mut(&mut self) -> &mut Outliner {
        &mut self.ctx.outliner
    }

    /// Scene and outliner together.
    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    /// Undo history of this session.
    pub fn history(&self) -> &CommandStack<EditorContext> {
        &self.history
    }

    /// Mutable history, e.g. to purge a scope.
    pub fn history_mut(&mut self) -> &mut CommandStack<EditorContext> {
        &mut self.history
    }

    /// Preferences the session was opened with.
    pub fn preferences(&self) -> &OutlinerPreferences {
        &self.preferences
    }

    /// Re-project the scene into the outliner.
    pub fn refresh(&mut self) {
        self.ctx.refresh();
    }

    /// Redraw the outliner without re-projecting.
    pub fn update(&mut self) {
        self.ctx.outliner.update();
    }

    /// Change the outliner's text filter.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.ctx.outliner.set_filter(&mut self.ctx.scene, filter);
    }

    /// Forward a row click to the outliner.
    pub fn click_node(&mut self, key: NodeKey, shift: bool, ctrl_or_meta: bool) {
        self.ctx.outliner.click_node(key, shift, ctrl_or_meta);
    }

    /// Keyboard navigation to a sibling row.
    pub fn go_to_sibling(&mut self, direction: SiblingDirection) -> bool {
        self.ctx.outliner.go_to_sibling(direction)
    }

    /// Expand or collapse the last selected row.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        self.ctx.outliner.set_expanded(expanded)
    }

    /// Select an object, expanding its ancestors.
    pub fn set_selected(&mut self, object: ObjectHandle, append: bool) -> bool {
        self.ctx.outliner.set_selected(object, append)
    }

    /// Selected objects in selection order.
    pub fn selected_objects(&self) -> Vec<ObjectHandle> {
        self.ctx.outliner.selected_objects()
    }

    /// Record an edit the caller has already applied.
    pub fn push_command(&mut self, entry: CommandEntry<EditorContext>) {
        self.history.push(entry);
    }

    /// Apply an edit and record it.
    pub fn execute_command(&mut self, entry: CommandEntry<EditorContext>) {
        self.history.execute(entry, &mut self.ctx);
    }

    /// Revert the last recorded edit.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.ctx)
    }

    /// Reapply the last reverted edit.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.ctx)
    }

    /// Move objects under `target` using the preferred transform policy.
    pub fn move_nodes(&mut self, objects: &[ObjectHandle], target: Option<ObjectHandle>) -> usize {
        let keep_world = self.preferences.keep_world_transform_on_move;
        self.move_nodes_with(objects, target, keep_world)
    }

    /// Move objects under `target` with an explicit transform policy.
    pub fn move_nodes_with(
        &mut self,
        objects: &[ObjectHandle],
        target: Option<ObjectHandle>,
        keep_world_transform: bool,
    ) -> usize {
        commands::move_nodes(
            &mut self.ctx,
            &mut self.history,
            objects,
            target,
            keep_world_transform,
        )
    }

    /// Move the current selection under `target`.
    pub fn move_selected(&mut self, target: Option<ObjectHandle>) -> usize {
        let selected = self.selected_objects();
        self.move_nodes(&selected, target)
    }

    /// Remove objects with their descendants and attachments.
    pub fn remove_nodes(&mut self, objects: &[ObjectHandle]) -> usize {
        commands::remove_nodes(&mut self.ctx, &mut self.history, objects)
    }

    /// Remove the current selection.
    pub fn remove_selected(&mut self) -> usize {
        let selected = self.selected_objects();
        self.remove_nodes(&selected)
    }

    /// Clone a node and select the copy. Not recorded in history.
    pub fn clone_node(&mut self, object: ObjectHandle) -> Result<ObjectHandle> {
        commands::clone_node(&mut self.ctx, object)
    }

    /// Rename an object as one undoable step.
    pub fn rename(&mut self, object: ObjectHandle, name: impl Into<String>) -> bool {
        commands::rename(&mut self.ctx, &mut self.history, object, name)
    }

    /// Remember `object` as the source of the next transform paste.
    pub fn copy_transform(&mut self, object: ObjectHandle) -> Result<()> {
        let source = self
            .ctx
            .scene
            .get(object)
            .ok_or(OutlinerError::ObjectNotFound(object))?;
        if !classify(source).has_transform() {
            log::warn!("{} has no transform to copy", object);
            return Ok(());
        }
        self.copied_transform = Some(object);
        self.update();
        Ok(())
    }

    /// Source of the next transform paste, if any.
    pub fn copied_transform(&self) -> Option<ObjectHandle> {
        self.copied_transform
    }

    /// Paste part of the copied transform onto `target`.
    pub fn paste_transform(&mut self, target: ObjectHandle, part: TransformPart) -> bool {
        let Some(source) = self.copied_transform else {
            return false;
        };
        commands::paste_transform(&mut self.ctx, &mut self.history, source, target, part)
    }

    /// Set or clear the do-not-export flag on objects.
    pub fn set_do_not_export(&mut self, objects: &[ObjectHandle], value: bool) -> usize {
        commands::set_do_not_export(&mut self.ctx, &mut self.history, objects, value)
    }

    /// Lock or unlock objects against removal.
    pub fn set_locked(&mut self, objects: &[ObjectHandle], value: bool) -> usize {
        commands::set_locked(&mut self.ctx, &mut self.history, objects, value)
    }

    /// Start dragging a row. A row outside the selection becomes the
    /// selection first. Unknown objects cannot be dragged.
    pub fn drag_payload(&mut self, object: ObjectHandle) -> Option<DragPayload> {
        if !classify(self.ctx.scene.get(object)?).is_draggable() {
            return None;
        }
        if !self.ctx.outliner.is_object_selected(object) {
            self.ctx.outliner.set_selected(object, false);
        }
        let node_id = ensure_object_id(&mut self.ctx.scene, object)?;
        let all_node_ids = self
            .selected_objects()
            .into_iter()
            .filter_map(|o| ensure_object_id(&mut self.ctx.scene, o))
            .collect();
        Some(DragPayload::new(node_id, all_node_ids))
    }

    /// Drop a serialized payload on `target`. The target itself is never
    /// moved. Returns the number of objects moved.
    pub fn drop_payload(
        &mut self,
        json: &str,
        target: Option<ObjectHandle>,
        keep_world_transform: bool,
    ) -> Result<usize> {
        let payload = DragPayload::from_json(json)?;
        if let Some(target) = target {
            let object = self
                .ctx
                .scene
                .get(target)
                .ok_or(OutlinerError::ObjectNotFound(target))?;
            if !classify(object).is_node() {
                return Ok(0);
            }
        }

        let objects: Vec<ObjectHandle> = payload
            .resolve(&self.ctx.scene)
            .into_iter()
            .filter(|&o| Some(o) != target)
            .collect();
        Ok(self.move_nodes_with(&objects, target, keep_world_transform))
    }
}
