//! Removal of outliner rows.
//!
//! Removed objects stay in the scene arena: they are unlisted from their
//! collection, detached and flagged `do_not_serialize`, so undo can put them
//! back for as long as the history entry lives.

use void_scene::{LodLevel, ObjectData, ObjectHandle, Scene, SoundData};

use super::flags::METADATA_LOCKED_KEY;
use super::root_objects;
use crate::classify::classify;
use crate::history::{CommandEntry, CommandStack};
use crate::session::EditorContext;

/// State tied to a removed object that is taken down and put back with it.
/// Indices are recorded when the state is taken down.
#[derive(Clone, Debug)]
enum SideEffect {
    /// Membership in a light's shadow render list.
    ShadowCaster { light: ObjectHandle, index: usize },
    /// Particle system emitted by, or reflection probe attached to, the
    /// removed object. Only unlisted.
    Adopted {
        object: ObjectHandle,
        index: Option<usize>,
    },
    /// Spatial sound attached to the removed object.
    Sound {
        sound: ObjectHandle,
        index: Option<usize>,
    },
    /// Level-of-detail meshes owned by the removed mesh.
    LodLevels {
        levels: Vec<LodLevel>,
        /// Each LOD mesh with its `do_not_serialize` flag before removal
        /// and its collection index.
        meshes: Vec<(ObjectHandle, bool, Option<usize>)>,
    },
}

#[derive(Clone, Debug)]
struct Removal {
    object: ObjectHandle,
    parent: Option<ObjectHandle>,
    do_not_serialize: bool,
    /// Index in the owning collection, filled on removal.
    collection_index: Option<usize>,
    side_effects: Vec<SideEffect>,
}

impl Removal {
    fn capture(scene: &Scene, object: ObjectHandle) -> Option<Self> {
        let data = scene.get(object)?;
        let mut side_effects: Vec<SideEffect> = scene
            .shadow_lists_containing(object)
            .into_iter()
            .map(|(light, index)| SideEffect::ShadowCaster { light, index })
            .collect();

        // Same lookups the reconciler adopts rows through, for every kind.
        side_effects.extend(
            scene
                .particle_systems_emitted_by(object)
                .into_iter()
                .chain(scene.probes_attached_to(object))
                .map(|object| SideEffect::Adopted {
                    object,
                    index: None,
                }),
        );
        side_effects.extend(
            scene
                .sounds_attached_to(object)
                .into_iter()
                .map(|sound| SideEffect::Sound { sound, index: None }),
        );

        if let ObjectData::Mesh(mesh) = &data.data {
            if !mesh.lod_levels.is_empty() {
                let meshes = mesh
                    .lod_levels
                    .iter()
                    .filter_map(|l| l.mesh)
                    .filter_map(|m| scene.get(m).map(|o| (m, o.do_not_serialize, None)))
                    .collect();
                side_effects.push(SideEffect::LodLevels {
                    levels: mesh.lod_levels.clone(),
                    meshes,
                });
            }
        }

        Some(Self {
            object,
            parent: data.parent,
            do_not_serialize: data.do_not_serialize,
            collection_index: None,
            side_effects,
        })
    }

    fn remove(&mut self, scene: &mut Scene) {
        for effect in &mut self.side_effects {
            effect.remove(scene, self.object);
        }

        if let Some(object) = scene.get_mut(self.object) {
            if object.is_hierarchical() {
                object.parent = None;
                object.do_not_serialize = true;
            }
        }
        self.collection_index = scene.remove_from_collection(self.object);
    }

    fn restore(&self, scene: &mut Scene) {
        if let Some(index) = self.collection_index {
            scene.insert_into_collection(self.object, index);
        }
        if let Some(object) = scene.get_mut(self.object) {
            if object.is_hierarchical() {
                object.parent = self.parent;
                object.do_not_serialize = self.do_not_serialize;
            }
        }

        for effect in self.side_effects.iter().rev() {
            effect.restore(scene, self.object);
        }
    }
}

impl SideEffect {
    fn remove(&mut self, scene: &mut Scene, owner: ObjectHandle) {
        match self {
            SideEffect::ShadowCaster { light, index } => {
                if let Some(ObjectData::Light(data)) = scene.get_mut(*light).map(|l| &mut l.data) {
                    if let Some(list) = &mut data.shadow_render_list {
                        if let Some(position) = list.iter().position(|&m| m == owner) {
                            *index = position;
                            list.remove(position);
                        }
                    }
                }
            }
            SideEffect::Adopted { object, index } => {
                *index = scene.remove_from_collection(*object);
            }
            SideEffect::Sound { sound, index } => {
                if let Some(ObjectData::Sound(data)) = scene.get_mut(*sound).map(|s| &mut s.data) {
                    data.attached_to = None;
                }
                *index = scene.remove_from_collection(*sound);
            }
            SideEffect::LodLevels { meshes, .. } => {
                if let Some(ObjectData::Mesh(mesh)) = scene.get_mut(owner).map(|o| &mut o.data) {
                    mesh.lod_levels.clear();
                }
                for (lod, _, index) in meshes.iter_mut() {
                    if let Some(object) = scene.get_mut(*lod) {
                        object.do_not_serialize = true;
                    }
                    *index = scene.remove_from_collection(*lod);
                }
            }
        }
    }

    fn restore(&self, scene: &mut Scene, owner: ObjectHandle) {
        match self {
            SideEffect::ShadowCaster { light, index } => {
                if let Some(ObjectData::Light(data)) = scene.get_mut(*light).map(|l| &mut l.data) {
                    if let Some(list) = &mut data.shadow_render_list {
                        if !list.contains(&owner) {
                            list.insert((*index).min(list.len()), owner);
                        }
                    }
                }
            }
            SideEffect::Adopted { object, index } => {
                if let Some(index) = index {
                    scene.insert_into_collection(*object, *index);
                }
            }
            SideEffect::Sound { sound, index } => {
                if let Some(ObjectData::Sound(data)) = scene.get_mut(*sound).map(|s| &mut s.data) {
                    *data = SoundData {
                        spatial: true,
                        attached_to: Some(owner),
                    };
                }
                if let Some(index) = index {
                    scene.insert_into_collection(*sound, *index);
                }
            }
            SideEffect::LodLevels { levels, meshes } => {
                for &(lod, do_not_serialize, index) in meshes.iter().rev() {
                    if let Some(index) = index {
                        scene.insert_into_collection(lod, index);
                    }
                    if let Some(object) = scene.get_mut(lod) {
                        object.do_not_serialize = do_not_serialize;
                    }
                }
                if let Some(ObjectData::Mesh(mesh)) = scene.get_mut(owner).map(|o| &mut o.data) {
                    mesh.lod_levels = levels.clone();
                }
            }
        }
    }
}

/// Remove objects and all their descendants.
///
/// Locked nodes are dropped from the candidates before anything else.
/// Returns the number of objects removed.
pub fn remove_nodes(
    ctx: &mut EditorContext,
    history: &mut CommandStack<EditorContext>,
    objects: &[ObjectHandle],
) -> usize {
    let candidates: Vec<ObjectHandle> = objects
        .iter()
        .copied()
        .filter(|&o| match ctx.scene.get(o) {
            Some(object) if classify(object).is_node() && object.metadata_flag(METADATA_LOCKED_KEY) => {
                log::warn!("Skipping locked node \"{}\"", object.name);
                false
            }
            Some(_) => ctx.scene.contains(o),
            None => false,
        })
        .collect();

    let mut expanded: Vec<ObjectHandle> = Vec::new();
    for root in root_objects(&ctx.scene, &candidates) {
        if !expanded.contains(&root) {
            expanded.push(root);
        }
        for descendant in ctx.scene.descendants(root) {
            if !expanded.contains(&descendant) {
                expanded.push(descendant);
            }
        }
    }

    let mut removals: Vec<Removal> = expanded
        .iter()
        .filter_map(|&o| Removal::capture(&ctx.scene, o))
        .collect();
    if removals.is_empty() {
        return 0;
    }

    for removal in &mut removals {
        removal.remove(&mut ctx.scene);
    }

    let count = removals.len();
    let undo_removals = removals.clone();
    history.push(
        CommandEntry::new(
            "Remove",
            move |ctx: &mut EditorContext| {
                for removal in undo_removals.iter().rev() {
                    removal.restore(&mut ctx.scene);
                }
            },
            move |ctx: &mut EditorContext| {
                for removal in &mut removals {
                    removal.remove(&mut ctx.scene);
                }
            },
        )
        .with_common(EditorContext::refresh),
    );

    log::info!("Removed {} object(s)", count);
    ctx.refresh();
    count
}
