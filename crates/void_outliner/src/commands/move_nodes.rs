//! Reparenting of outliner rows.

use glam::Mat4;
use void_scene::{ObjectData, ObjectHandle, Scene, Transform};

use super::root_objects;
use crate::classify::{classify, NodeKind};
use crate::history::{CommandEntry, CommandStack};
use crate::session::EditorContext;

/// Where an object hangs in the outliner, in the terms of its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Attachment {
    /// Structural parent of a node, with its local transform under it.
    Parent {
        parent: Option<ObjectHandle>,
        transform: Transform,
    },
    /// Emitter of a particle system.
    Emitter(Option<ObjectHandle>),
    /// Mesh a sound follows. Attached sounds are spatial.
    Sound {
        attached_to: Option<ObjectHandle>,
        spatial: bool,
    },
    /// Mesh a reflection probe is attached to.
    Probe(Option<ObjectHandle>),
}

impl Attachment {
    /// Current attachment of an object, `None` for kinds that cannot move.
    pub fn capture(scene: &Scene, object: ObjectHandle) -> Option<Self> {
        let object = scene.get(object)?;
        match &object.data {
            ObjectData::TransformNode(_)
            | ObjectData::Mesh(_)
            | ObjectData::Light(_)
            | ObjectData::Camera(_) => Some(Attachment::Parent {
                parent: object.parent,
                transform: *object.transform()?,
            }),
            ObjectData::ParticleSystem(data) => Some(Attachment::Emitter(data.emitter)),
            ObjectData::Sound(data) => Some(Attachment::Sound {
                attached_to: data.attached_to,
                spatial: data.spatial,
            }),
            ObjectData::ReflectionProbe(data) => Some(Attachment::Probe(data.attached_mesh)),
            ObjectData::Other { .. } => None,
        }
    }

    /// Write this attachment back. Mismatched kinds are left untouched.
    pub fn apply(&self, scene: &mut Scene, object: ObjectHandle) {
        let Some(object) = scene.get_mut(object) else {
            return;
        };
        match self {
            Attachment::Parent { parent, transform } => {
                if object.is_hierarchical() {
                    object.parent = *parent;
                    if let Some(t) = object.transform_mut() {
                        *t = *transform;
                    }
                }
            }
            Attachment::Emitter(emitter) => {
                if let ObjectData::ParticleSystem(data) = &mut object.data {
                    data.emitter = *emitter;
                }
            }
            Attachment::Sound {
                attached_to,
                spatial,
            } => {
                if let ObjectData::Sound(data) = &mut object.data {
                    data.attached_to = *attached_to;
                    data.spatial = *spatial;
                }
            }
            Attachment::Probe(mesh) => {
                if let ObjectData::ReflectionProbe(data) = &mut object.data {
                    data.attached_mesh = *mesh;
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
struct MoveRecord {
    object: ObjectHandle,
    before: Attachment,
    after: Attachment,
}

/// Attachment `object` gets when dropped on `target`, `None` when the move
/// is not allowed for this object.
fn attachment_after(
    scene: &Scene,
    object: ObjectHandle,
    before: &Attachment,
    target: Option<ObjectHandle>,
    keep_world_transform: bool,
) -> Option<Attachment> {
    let kind = classify(scene.get(object)?);
    let target_kind = match target {
        Some(t) => Some(classify(scene.get(t)?)),
        None => None,
    };
    if !kind.can_attach_to(target_kind) {
        return None;
    }

    match before {
        Attachment::Parent { transform, .. } => {
            if let Some(t) = target {
                if t == object || scene.is_ancestor(object, t) {
                    return None;
                }
            }
            let transform = if keep_world_transform && kind.is_transform_node() {
                let world = scene.world_matrix(object);
                let parent_world = target.map_or(Mat4::IDENTITY, |t| scene.world_matrix(t));
                Transform::from_matrix(parent_world.inverse() * world)
            } else {
                *transform
            };
            Some(Attachment::Parent {
                parent: target,
                transform,
            })
        }
        Attachment::Emitter(_) => Some(Attachment::Emitter(target)),
        Attachment::Sound { .. } => Some(Attachment::Sound {
            attached_to: target,
            spatial: target.is_some(),
        }),
        Attachment::Probe(_) => Some(Attachment::Probe(target)),
    }
}

/// Move objects under `target` (`None` detaches them to the root).
///
/// Only the roots of the selection move; selected descendants follow their
/// ancestor. Objects that cannot go under `target` are skipped one by one.
/// Returns the number of objects moved.
pub fn move_nodes(
    ctx: &mut EditorContext,
    history: &mut CommandStack<EditorContext>,
    objects: &[ObjectHandle],
    target: Option<ObjectHandle>,
    keep_world_transform: bool,
) -> usize {
    if target.is_some_and(|t| !ctx.scene.contains(t)) {
        log::warn!("Move target {:?} is not in the scene", target);
        return 0;
    }

    let mut records = Vec::new();
    for object in root_objects(&ctx.scene, objects) {
        let Some(before) = Attachment::capture(&ctx.scene, object) else {
            continue;
        };
        let Some(after) =
            attachment_after(&ctx.scene, object, &before, target, keep_world_transform)
        else {
            log::warn!(
                "Cannot move {} ({}) under {:?}",
                object,
                ctx.scene.get(object).map_or(NodeKind::Unknown, classify).name(),
                target
            );
            continue;
        };

        after.apply(&mut ctx.scene, object);
        records.push(MoveRecord {
            object,
            before,
            after,
        });
    }

    if records.is_empty() {
        return 0;
    }

    let count = records.len();
    let undo_records = records.clone();
    history.push(
        CommandEntry::new(
            "Move",
            move |ctx: &mut EditorContext| {
                for record in undo_records.iter().rev() {
                    record.before.apply(&mut ctx.scene, record.object);
                }
            },
            move |ctx: &mut EditorContext| {
                for record in &records {
                    record.after.apply(&mut ctx.scene, record.object);
                }
            },
        )
        .with_common(EditorContext::refresh),
    );

    log::info!("Moved {} object(s) under {:?}", count, target);
    ctx.refresh();
    count
}
