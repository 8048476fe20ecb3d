use std::collections::HashMap;

use void_scene::{ObjectData, ObjectHandle, Scene};

use crate::classify::classify;
use crate::error::{OutlinerError, Result};
use crate::ids::fresh_id;
use crate::session::EditorContext;

/// Metadata entry listing references still to be rebound after a load.
/// Never carried over to a copy.
pub const METADATA_PENDING_REFERENCES_KEY: &str = "pendingReferences";

/// Copy one object (and its hierarchical descendants) with fresh ids. The
/// copy keeps the parent of its source and is listed in every shadow render
/// list the source is in.
fn copy_subtree(
    scene: &mut Scene,
    source: ObjectHandle,
    parent: Option<ObjectHandle>,
    copies: &mut HashMap<ObjectHandle, ObjectHandle>,
) -> Option<ObjectHandle> {
    let mut copy = scene.get(source)?.clone();
    copy.id = Some(fresh_id());
    copy.parent = parent;
    if let Some(metadata) = &mut copy.metadata {
        metadata.remove(METADATA_PENDING_REFERENCES_KEY);
    }
    if let ObjectData::Mesh(mesh) = &mut copy.data {
        mesh.lod_levels.clear();
    }

    let handle = scene.spawn(copy);
    copies.insert(source, handle);

    for (light, _) in scene.shadow_lists_containing(source) {
        if let Some(ObjectData::Light(data)) = scene.get_mut(light).map(|l| &mut l.data) {
            if let Some(list) = &mut data.shadow_render_list {
                list.push(handle);
            }
        }
    }

    for child in scene.children(source) {
        let cloneable = scene.get(child).is_some_and(|o| classify(o).is_cloneable());
        if cloneable && scene.contains(child) && !copies.contains_key(&child) {
            copy_subtree(scene, child, Some(handle), copies);
        }
    }
    Some(handle)
}

/// Clone a node and select the copy.
///
/// Cloning is not recorded in the history: undo does not remove the copy,
/// only later edits made to it are undoable.
pub fn clone_node(ctx: &mut EditorContext, object: ObjectHandle) -> Result<ObjectHandle> {
    let source = ctx
        .scene
        .get(object)
        .ok_or(OutlinerError::ObjectNotFound(object))?;
    let kind = classify(source);
    if !kind.is_cloneable() {
        return Err(OutlinerError::NotCloneable { kind });
    }
    let parent = source.parent;

    let mut copies = HashMap::new();
    let copy = copy_subtree(&mut ctx.scene, object, parent, &mut copies)
        .ok_or(OutlinerError::ObjectNotFound(object))?;

    log::info!("Cloned {} into {} ({} object(s))", object, copy, copies.len());
    ctx.refresh();
    ctx.outliner.set_selected(copy, false);
    Ok(copy)
}
