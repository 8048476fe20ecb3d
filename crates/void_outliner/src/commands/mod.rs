//! Structural mutators.
//!
//! Every mutator applies its forward change to the scene first, then records
//! a [`CommandEntry`](crate::history::CommandEntry) whose `common` callback
//! refreshes the outliner, then refreshes once itself. The history never
//! touches the scene on its own; it only replays the recorded closures.

mod clone;
mod flags;
mod move_nodes;
mod remove;
mod rename;
mod transform;

pub use clone::{clone_node, METADATA_PENDING_REFERENCES_KEY};
pub use flags::{set_do_not_export, set_locked, METADATA_DO_NOT_EXPORT_KEY, METADATA_LOCKED_KEY};
pub use move_nodes::{move_nodes, Attachment};
pub use remove::remove_nodes;
pub use rename::rename;
pub use transform::{paste_transform, TransformPart, TransformSnapshot};

use void_scene::{ObjectData, ObjectHandle, Scene};

/// What the outliner shows an object under: the structural parent for
/// nodes and unsupported entities, the emitter for particle systems, the attached mesh for spatial
/// sounds and reflection probes.
pub fn logical_parent(scene: &Scene, object: ObjectHandle) -> Option<ObjectHandle> {
    let object = scene.get(object)?;
    match &object.data {
        ObjectData::TransformNode(_)
        | ObjectData::Mesh(_)
        | ObjectData::Light(_)
        | ObjectData::Camera(_)
        | ObjectData::Other { .. } => object.parent,
        ObjectData::ParticleSystem(data) => data.emitter,
        ObjectData::Sound(data) if data.spatial => data.attached_to,
        ObjectData::Sound(_) => None,
        ObjectData::ReflectionProbe(data) => data.attached_mesh,
    }
}

/// Reduce a selection to its roots: objects none of whose logical
/// ancestors is also selected. Duplicates are dropped, order is kept.
pub fn root_objects(scene: &Scene, objects: &[ObjectHandle]) -> Vec<ObjectHandle> {
    let mut unique: Vec<ObjectHandle> = Vec::with_capacity(objects.len());
    for &object in objects {
        if !unique.contains(&object) {
            unique.push(object);
        }
    }

    unique
        .iter()
        .copied()
        .filter(|&object| !has_ancestor_in(scene, object, &unique))
        .collect()
}

fn has_ancestor_in(scene: &Scene, object: ObjectHandle, set: &[ObjectHandle]) -> bool {
    let mut current = logical_parent(scene, object);
    let mut steps = 0;
    while let Some(parent) = current {
        if set.contains(&parent) {
            return true;
        }
        steps += 1;
        if steps > scene.object_count() {
            log::warn!("Parent chain of {} does not terminate", object);
            return false;
        }
        current = logical_parent(scene, parent);
    }
    false
}
