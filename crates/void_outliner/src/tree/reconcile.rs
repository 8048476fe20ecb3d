//! Tree reconciliation.
//!
//! Walks the live scene and produces a fresh [`GraphTree`], carrying the
//! selection and expansion flags of the previous tree over to nodes that
//! project the same object. Matching is by object handle, never by id, so
//! flags survive an id being (re)assigned between passes.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use void_scene::{CollectionKind, ObjectData, ObjectHandle, Scene, SceneObject};

use super::{GraphNode, GraphTree, NodeKey, PseudoRoot};
use crate::classify::{classify, NodeKind};
use crate::commands::logical_parent;
use crate::ids::{ensure_object_id, reassign_id};

/// Metadata entry marking a mesh as a collider proxy.
pub const METADATA_COLLIDER_KEY: &str = "collider";
/// Metadata entry mirroring the mesh's pickability.
pub const METADATA_PICKABLE_KEY: &str = "isPickable";

#[derive(Clone, Copy, Default)]
struct CarriedFlags {
    selected: bool,
    expanded: bool,
}

/// Projects the scene graph onto the outliner tree.
#[derive(Clone, Debug, Default)]
pub struct TreeReconciler {
    filter: String,
    case_sensitive: bool,
    /// Rows that were expanded before the current filter was applied.
    pre_filter_expanded: Option<HashSet<NodeKey>>,
}

impl TreeReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        !self.filter.is_empty()
    }

    /// Change the text filter. Takes effect on the next refresh.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Build a new tree from the scene. `previous` is only read.
    pub fn refresh(&mut self, scene: &mut Scene, previous: &GraphTree) -> GraphTree {
        let mut carried = HashMap::new();
        previous.for_each(|n| {
            carried.insert(
                n.key,
                CarriedFlags {
                    selected: n.is_selected,
                    expanded: n.is_expanded,
                },
            );
        });

        if self.is_filtering() && self.pre_filter_expanded.is_none() {
            let mut expanded = HashSet::new();
            previous.for_each(|n| {
                if n.is_expanded {
                    expanded.insert(n.key);
                }
            });
            self.pre_filter_expanded = Some(expanded);
        }

        let filter = if self.case_sensitive {
            self.filter.clone()
        } else {
            self.filter.to_lowercase()
        };

        let mut pass = Pass {
            scene,
            carried: &carried,
            filter,
            case_sensitive: self.case_sensitive,
            seen_ids: PseudoRoot::ALL.iter().map(|r| r.id().to_string()).collect(),
            seen_objects: HashSet::new(),
        };

        let mut roots: Vec<GraphNode> = PseudoRoot::ALL
            .iter()
            .map(|&root| {
                let mut node = GraphNode::pseudo(root);
                let flags = carried.get(&node.key).copied().unwrap_or_default();
                node.is_selected = flags.selected;
                node.is_expanded = flags.expanded;
                node
            })
            .collect();

        for handle in pass.root_objects() {
            if let Some(node) = pass.visit(handle) {
                roots.push(node);
            }
        }

        let mut tree = GraphTree::new(roots, PseudoRoot::ALL.len());

        if !self.is_filtering() {
            if let Some(expanded) = self.pre_filter_expanded.take() {
                tree.for_each_mut(|n| n.is_expanded = expanded.contains(&n.key));
            }
        }

        log::debug!(
            "Reconciled outliner: {} rows (filter: {:?})",
            tree.flatten().len(),
            self.filter
        );
        tree
    }
}

/// State of one reconciliation pass.
struct Pass<'a> {
    scene: &'a mut Scene,
    carried: &'a HashMap<NodeKey, CarriedFlags>,
    filter: String,
    case_sensitive: bool,
    seen_ids: HashSet<String>,
    seen_objects: HashSet<ObjectHandle>,
}

impl Pass<'_> {
    /// Hierarchy roots, then particle systems, sounds and reflection probes
    /// that no row in the tree adopts.
    fn root_objects(&self) -> Vec<ObjectHandle> {
        let scene = &*self.scene;
        let mut roots: Vec<ObjectHandle> = scene
            .handles()
            .filter(|&h| {
                scene.get(h).is_some_and(|o| o.is_hierarchical())
                    && scene.contains(h)
                    && host_of(scene, h).is_none()
            })
            .collect();

        for kind in [
            CollectionKind::ParticleSystems,
            CollectionKind::Sounds,
            CollectionKind::ReflectionProbes,
        ] {
            roots.extend(
                scene
                    .collection(kind)
                    .iter()
                    .copied()
                    .filter(|&o| !host_of(scene, o).is_some_and(|host| is_projected(scene, host))),
            );
        }

        roots
    }

    fn matches_filter(&self, label: &str) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        if self.case_sensitive {
            label.contains(&self.filter)
        } else {
            label.to_lowercase().contains(&self.filter)
        }
    }

    fn visit(&mut self, handle: ObjectHandle) -> Option<GraphNode> {
        if !is_shown(self.scene, handle) {
            return None;
        }

        let object = self.scene.get(handle)?;
        let kind = classify(object);
        let label = if object.name.is_empty() {
            object.class_name().to_string()
        } else {
            object.name.clone()
        };
        let disabled = kind == NodeKind::Mesh
            && !matches!(
                object.metadata_value(METADATA_COLLIDER_KEY),
                None | Some(Value::Null)
            );

        if !self.seen_objects.insert(handle) {
            return None;
        }

        let mut id = ensure_object_id(self.scene, handle)?;
        if !self.seen_ids.insert(id.clone()) {
            let object = self.scene.get_mut(handle)?;
            id = reassign_id(object);
            log::warn!(
                "Duplicate outliner id on \"{}\", assigned {}",
                label,
                id
            );
            self.seen_ids.insert(id.clone());
        }

        if disabled {
            if let Some(object) = self.scene.get_mut(handle) {
                object.set_metadata_flag(METADATA_PICKABLE_KEY, false);
            }
        }

        let children = self.visit_children(handle, kind);

        if !self.matches_filter(&label) && children.is_empty() {
            return None;
        }

        let key = NodeKey::Object(handle);
        let flags = self.carried.get(&key).copied().unwrap_or_default();

        Some(GraphNode {
            id,
            label,
            icon: kind.icon(),
            kind,
            key,
            has_caret: !children.is_empty(),
            children,
            is_selected: flags.selected,
            is_expanded: if self.filter.is_empty() {
                flags.expanded
            } else {
                true
            },
            disabled,
        })
    }

    /// Hierarchical children, then adopted particle systems, sounds and
    /// reflection probes.
    fn visit_children(&mut self, handle: ObjectHandle, kind: NodeKind) -> Vec<GraphNode> {
        match kind {
            NodeKind::TransformNode | NodeKind::Mesh | NodeKind::Light | NodeKind::Camera => {
                let mut candidates = self.scene.children(handle);
                candidates.extend(self.scene.particle_systems_emitted_by(handle));
                candidates.extend(self.scene.sounds_attached_to(handle));
                candidates.extend(self.scene.probes_attached_to(handle));

                candidates
                    .into_iter()
                    .filter_map(|c| self.visit(c))
                    .collect()
            }
            NodeKind::Scene
            | NodeKind::ParticleSystem
            | NodeKind::Sound
            | NodeKind::ReflectionProbe
            | NodeKind::Unknown => Vec::new(),
        }
    }
}

/// Whether the object may get a row at all: listed, not the editor camera,
/// not `do_not_serialize`, and not a LOD mesh.
fn is_shown(scene: &Scene, handle: ObjectHandle) -> bool {
    if !scene.contains(handle) || scene.editor_camera() == Some(handle) {
        return false;
    }
    match scene.get(handle) {
        Some(object) if object.do_not_serialize => false,
        Some(SceneObject {
            data: ObjectData::Mesh(mesh),
            ..
        }) => mesh.master_mesh.is_none(),
        Some(_) => true,
        None => false,
    }
}

/// The row an object would be adopted under. Only node kinds adopt rows.
fn host_of(scene: &Scene, handle: ObjectHandle) -> Option<ObjectHandle> {
    let host = logical_parent(scene, handle)?;
    scene.get(host).filter(|o| classify(o).is_node())?;
    Some(host)
}

/// Whether the object ends up in an unfiltered tree: shown itself, and
/// either a root or adopted by a host that is in the tree.
fn is_projected(scene: &Scene, handle: ObjectHandle) -> bool {
    let limit = scene.handles().count();
    let mut current = handle;
    for _ in 0..=limit {
        if !is_shown(scene, current) {
            return false;
        }
        match host_of(scene, current) {
            Some(host) => current = host,
            None => return true,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::object_id;

    fn labels(tree: &GraphTree) -> Vec<String> {
        tree.flatten().iter().map(|n| n.label.clone()).collect()
    }

    fn attach_sound(scene: &mut Scene, sound: ObjectHandle, mesh: ObjectHandle) {
        if let ObjectData::Sound(data) = &mut scene.get_mut(sound).unwrap().data {
            data.spatial = true;
            data.attached_to = Some(mesh);
        }
    }

    #[test]
    fn test_pseudo_roots_come_first() {
        let mut scene = Scene::new();
        scene.add_mesh("box");
        let mut reconciler = TreeReconciler::new();

        let tree = reconciler.refresh(&mut scene, &GraphTree::default());

        assert_eq!(
            labels(&tree),
            vec!["Scene", "Sounds", "Reflection Probes", "box"]
        );
        assert_eq!(tree.fixed_prefix_len(), 3);
    }

    #[test]
    fn test_adopted_children_order() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("ship");
        let sound = scene.add_sound("engine");
        attach_sound(&mut scene, sound, mesh);
        scene.add_particle_system("exhaust", Some(mesh));
        let probe = scene.add_reflection_probe("probe");
        if let ObjectData::ReflectionProbe(data) = &mut scene.get_mut(probe).unwrap().data {
            data.attached_mesh = Some(mesh);
        }
        let child = scene.add_transform_node("turret");
        scene.set_parent(child, Some(mesh));
        scene.add_sound("music");
        scene.add_reflection_probe("sky");

        let tree = TreeReconciler::new().refresh(&mut scene, &GraphTree::default());

        assert_eq!(
            labels(&tree)[3..],
            ["ship", "turret", "exhaust", "engine", "probe", "music", "sky"]
        );
        assert!(tree.find(NodeKey::Object(mesh)).unwrap().has_caret);
    }

    #[test]
    fn test_excluded_objects() {
        let mut scene = Scene::new();
        let camera = scene.add_camera("editor camera");
        scene.set_editor_camera(Some(camera));
        let hidden = scene.add_mesh("helper");
        scene.get_mut(hidden).unwrap().do_not_serialize = true;
        let master = scene.add_mesh("master");
        let lod = scene.add_mesh("lod");
        if let ObjectData::Mesh(data) = &mut scene.get_mut(lod).unwrap().data {
            data.master_mesh = Some(master);
        }
        let gone = scene.add_light("gone");
        scene.remove_from_collection(gone);
        let below = scene.add_mesh("below helper");
        scene.set_parent(below, Some(hidden));

        let tree = TreeReconciler::new().refresh(&mut scene, &GraphTree::default());

        assert_eq!(labels(&tree)[3..], ["master"]);
    }

    #[test]
    fn test_unknown_objects_are_inert_leaves() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("mesh");
        let gizmo = scene.spawn(SceneObject::new(
            "gizmo",
            ObjectData::Other {
                class_name: "GizmoManager".into(),
            },
        ));
        scene.set_parent(gizmo, Some(mesh));
        let free = scene.spawn(SceneObject::new(
            "",
            ObjectData::Other {
                class_name: "SpriteManager".into(),
            },
        ));
        let pivot = scene.add_transform_node("pivot");
        scene.set_parent(pivot, Some(gizmo));

        let tree = TreeReconciler::new().refresh(&mut scene, &GraphTree::default());

        assert_eq!(labels(&tree)[3..], ["mesh", "gizmo", "SpriteManager", "pivot"]);
        assert_eq!(
            tree.parent_of(NodeKey::Object(gizmo)).map(|n| n.key),
            Some(NodeKey::Object(mesh))
        );
        for leaf in [gizmo, free] {
            let node = tree.find(NodeKey::Object(leaf)).unwrap();
            assert_eq!(node.kind, NodeKind::Unknown);
            assert!(node.children.is_empty());
            assert!(!node.has_caret);
        }
    }

    #[test]
    fn test_attachments_to_hidden_targets_become_roots() {
        let mut scene = Scene::new();
        let ship = scene.add_mesh("ship");
        let helper = scene.add_mesh("helper");
        scene.get_mut(helper).unwrap().do_not_serialize = true;
        scene.add_particle_system("sparks", Some(ship));
        let engine = scene.add_sound("engine");
        attach_sound(&mut scene, engine, ship);
        let hum = scene.add_sound("hum");
        attach_sound(&mut scene, hum, helper);
        let lost = scene.add_sound("lost");
        attach_sound(&mut scene, lost, ObjectHandle(99));
        let probe = scene.add_reflection_probe("probe");
        if let ObjectData::ReflectionProbe(data) = &mut scene.get_mut(probe).unwrap().data {
            data.attached_mesh = Some(ship);
        }
        let mut reconciler = TreeReconciler::new();
        let before = reconciler.refresh(&mut scene, &GraphTree::default());
        assert_eq!(
            labels(&before)[3..],
            ["ship", "sparks", "engine", "probe", "hum", "lost"]
        );

        scene.remove_from_collection(ship);
        let tree = reconciler.refresh(&mut scene, &before);

        assert_eq!(labels(&tree)[3..], ["sparks", "engine", "hum", "lost", "probe"]);
        assert!(tree.parent_of(NodeKey::Object(engine)).is_none());
    }

    #[test]
    fn test_reserved_ids_are_repaired() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("box");
        scene.get_mut(mesh).unwrap().id = Some(PseudoRoot::Scene.id().into());

        let tree = TreeReconciler::new().refresh(&mut scene, &GraphTree::default());

        let ids: HashSet<String> = tree.flatten().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids.len(), tree.flatten().len());
        let row = tree.find(NodeKey::Object(mesh)).unwrap();
        assert_ne!(row.id, PseudoRoot::Scene.id());
        assert_eq!(scene.get(mesh).unwrap().id.as_deref(), Some(row.id.as_str()));
        assert_eq!(
            tree.find_by_id(PseudoRoot::Scene.id()).unwrap().key,
            NodeKey::Pseudo(PseudoRoot::Scene)
        );
    }

    #[test]
    fn test_flags_carried_by_object_not_id() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("box");
        let mut reconciler = TreeReconciler::new();

        let mut first = reconciler.refresh(&mut scene, &GraphTree::default());
        let node = first.find_mut(NodeKey::Object(mesh)).unwrap();
        node.is_selected = true;
        node.is_expanded = true;
        let first_id = node.id.clone();

        scene.get_mut(mesh).unwrap().id = None;
        let second = reconciler.refresh(&mut scene, &first);
        let node = second.find(NodeKey::Object(mesh)).unwrap();

        assert_ne!(node.id, first_id);
        assert!(node.is_selected);
        assert!(node.is_expanded);
    }

    #[test]
    fn test_new_objects_default_flags() {
        let mut scene = Scene::new();
        scene.add_mesh("a");
        let mut reconciler = TreeReconciler::new();
        let first = reconciler.refresh(&mut scene, &GraphTree::default());

        let b = scene.add_mesh("b");
        let second = reconciler.refresh(&mut scene, &first);

        let node = second.find(NodeKey::Object(b)).unwrap();
        assert!(!node.is_selected);
        assert!(!node.is_expanded);
    }

    #[test]
    fn test_synthetic_ids_stable_across_passes() {
        let mut scene = Scene::new();
        let sound = scene.add_sound("music");
        let mut reconciler = TreeReconciler::new();

        let first = reconciler.refresh(&mut scene, &GraphTree::default());
        let second = reconciler.refresh(&mut scene, &first);

        let a = &first.find(NodeKey::Object(sound)).unwrap().id;
        let b = &second.find(NodeKey::Object(sound)).unwrap().id;
        assert_eq!(a, b);
        assert_eq!(object_id(scene.get(sound).unwrap()), Some(a.as_str()));
    }

    #[test]
    fn test_duplicate_ids_are_repaired() {
        let mut scene = Scene::new();
        let a = scene.add_mesh("a");
        let b = scene.add_mesh("b");
        scene.get_mut(a).unwrap().id = Some("same".into());
        scene.get_mut(b).unwrap().id = Some("same".into());

        let tree = TreeReconciler::new().refresh(&mut scene, &GraphTree::default());

        let ids: HashSet<String> = tree.flatten().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids.len(), tree.flatten().len());
        assert_eq!(scene.get(a).unwrap().id.as_deref(), Some("same"));
        assert_ne!(scene.get(b).unwrap().id.as_deref(), Some("same"));
    }

    #[test]
    fn test_collider_meshes_are_disabled() {
        let mut scene = Scene::new();
        let collider = scene.add_mesh("collider");
        scene
            .get_mut(collider)
            .unwrap()
            .metadata_mut()
            .insert(METADATA_COLLIDER_KEY.into(), Value::from("box"));

        let tree = TreeReconciler::new().refresh(&mut scene, &GraphTree::default());

        assert!(tree.find(NodeKey::Object(collider)).unwrap().disabled);
        assert_eq!(
            scene
                .get(collider)
                .unwrap()
                .metadata_value(METADATA_PICKABLE_KEY),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn test_filter_keeps_ancestors_and_expands() {
        let mut scene = Scene::new();
        let root = scene.add_transform_node("level");
        let lamp = scene.add_light("lamp");
        scene.set_parent(lamp, Some(root));
        let crate_mesh = scene.add_mesh("crate");
        scene.set_parent(crate_mesh, Some(root));
        scene.add_mesh("barrel");
        let mut reconciler = TreeReconciler::new();
        let unfiltered = reconciler.refresh(&mut scene, &GraphTree::default());

        reconciler.set_filter("LAMP");
        let tree = reconciler.refresh(&mut scene, &unfiltered);

        assert_eq!(labels(&tree)[3..], ["level", "lamp"]);
        let level = tree.find(NodeKey::Object(root)).unwrap();
        assert!(level.is_expanded);
        assert!(level.has_caret);
        assert!(!tree.find(NodeKey::Object(lamp)).unwrap().has_caret);
    }

    #[test]
    fn test_caret_hidden_when_children_filtered_out() {
        let mut scene = Scene::new();
        let root = scene.add_transform_node("lamp holder");
        let child = scene.add_mesh("bulb");
        scene.set_parent(child, Some(root));
        let mut reconciler = TreeReconciler::new();
        let unfiltered = reconciler.refresh(&mut scene, &GraphTree::default());
        assert!(unfiltered.find(NodeKey::Object(root)).unwrap().has_caret);

        reconciler.set_filter("holder");
        let tree = reconciler.refresh(&mut scene, &unfiltered);

        let node = tree.find(NodeKey::Object(root)).unwrap();
        assert!(node.children.is_empty());
        assert!(!node.has_caret);
    }

    #[test]
    fn test_clearing_filter_restores_expansion() {
        let mut scene = Scene::new();
        let a = scene.add_transform_node("a");
        let a_child = scene.add_mesh("needle a");
        scene.set_parent(a_child, Some(a));
        let b = scene.add_transform_node("b");
        let b_child = scene.add_mesh("needle b");
        scene.set_parent(b_child, Some(b));

        let mut reconciler = TreeReconciler::new();
        let mut tree = reconciler.refresh(&mut scene, &GraphTree::default());
        tree.find_mut(NodeKey::Object(a)).unwrap().is_expanded = true;

        reconciler.set_filter("needle");
        let filtered = reconciler.refresh(&mut scene, &tree);
        assert!(filtered.find(NodeKey::Object(b)).unwrap().is_expanded);

        reconciler.set_filter("needle b");
        let narrowed = reconciler.refresh(&mut scene, &filtered);

        reconciler.set_filter("");
        let restored = reconciler.refresh(&mut scene, &narrowed);

        assert!(restored.find(NodeKey::Object(a)).unwrap().is_expanded);
        assert!(!restored.find(NodeKey::Object(b)).unwrap().is_expanded);
        assert!(!restored.find(NodeKey::Object(b_child)).unwrap().is_expanded);
    }
}
