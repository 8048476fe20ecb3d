//! The scene: object arena plus per-kind owning collections.

use glam::Mat4;

use crate::object::{
    CameraData, LightData, MeshData, ObjectData, ParticleSystemData, ReflectionProbeData,
    SceneObject, SoundData, Transform,
};
use crate::ObjectHandle;

/// Owning collection an object is listed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Meshes,
    TransformNodes,
    Lights,
    Cameras,
    ParticleSystems,
    Sounds,
    ReflectionProbes,
}

impl CollectionKind {
    /// Collection owning objects carrying the given data, `None` for
    /// unsupported engine entities.
    pub fn for_data(data: &ObjectData) -> Option<Self> {
        match data {
            ObjectData::TransformNode(_) => Some(Self::TransformNodes),
            ObjectData::Mesh(_) => Some(Self::Meshes),
            ObjectData::Light(_) => Some(Self::Lights),
            ObjectData::Camera(_) => Some(Self::Cameras),
            ObjectData::ParticleSystem(_) => Some(Self::ParticleSystems),
            ObjectData::Sound(_) => Some(Self::Sounds),
            ObjectData::ReflectionProbe(_) => Some(Self::ReflectionProbes),
            ObjectData::Other { .. } => None,
        }
    }
}

/// Live scene graph.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,

    meshes: Vec<ObjectHandle>,
    transform_nodes: Vec<ObjectHandle>,
    lights: Vec<ObjectHandle>,
    cameras: Vec<ObjectHandle>,
    particle_systems: Vec<ObjectHandle>,
    sounds: Vec<ObjectHandle>,
    reflection_probes: Vec<ObjectHandle>,

    /// Viewport camera of the editing session.
    editor_camera: Option<ObjectHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the arena and list it in its owning collection.
    pub fn spawn(&mut self, object: SceneObject) -> ObjectHandle {
        let handle = ObjectHandle(self.objects.len() as u32);
        self.objects.push(object);
        self.add_to_collection(handle);
        handle
    }

    pub fn add_transform_node(&mut self, name: impl Into<String>) -> ObjectHandle {
        self.spawn(SceneObject::new(name, ObjectData::TransformNode(Transform::new())))
    }

    pub fn add_mesh(&mut self, name: impl Into<String>) -> ObjectHandle {
        self.spawn(SceneObject::new(name, ObjectData::Mesh(MeshData::default())))
    }

    pub fn add_light(&mut self, name: impl Into<String>) -> ObjectHandle {
        self.spawn(SceneObject::new(name, ObjectData::Light(LightData::default())))
    }

    pub fn add_camera(&mut self, name: impl Into<String>) -> ObjectHandle {
        self.spawn(SceneObject::new(name, ObjectData::Camera(CameraData::default())))
    }

    pub fn add_particle_system(
        &mut self,
        name: impl Into<String>,
        emitter: Option<ObjectHandle>,
    ) -> ObjectHandle {
        self.spawn(SceneObject::new(
            name,
            ObjectData::ParticleSystem(ParticleSystemData { emitter }),
        ))
    }

    pub fn add_sound(&mut self, name: impl Into<String>) -> ObjectHandle {
        self.spawn(SceneObject::new(name, ObjectData::Sound(SoundData::default())))
    }

    pub fn add_reflection_probe(&mut self, name: impl Into<String>) -> ObjectHandle {
        let name = name.into();
        let data = ReflectionProbeData {
            attached_mesh: None,
            cube_texture_name: name.clone(),
        };
        self.spawn(SceneObject::new(name, ObjectData::ReflectionProbe(data)))
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        self.objects.get_mut(handle.index())
    }

    /// Every handle ever issued, in creation order.
    pub fn handles(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        (0..self.objects.len() as u32).map(ObjectHandle)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn collection(&self, kind: CollectionKind) -> &[ObjectHandle] {
        match kind {
            CollectionKind::Meshes => &self.meshes,
            CollectionKind::TransformNodes => &self.transform_nodes,
            CollectionKind::Lights => &self.lights,
            CollectionKind::Cameras => &self.cameras,
            CollectionKind::ParticleSystems => &self.particle_systems,
            CollectionKind::Sounds => &self.sounds,
            CollectionKind::ReflectionProbes => &self.reflection_probes,
        }
    }

    fn collection_mut(&mut self, kind: CollectionKind) -> &mut Vec<ObjectHandle> {
        match kind {
            CollectionKind::Meshes => &mut self.meshes,
            CollectionKind::TransformNodes => &mut self.transform_nodes,
            CollectionKind::Lights => &mut self.lights,
            CollectionKind::Cameras => &mut self.cameras,
            CollectionKind::ParticleSystems => &mut self.particle_systems,
            CollectionKind::Sounds => &mut self.sounds,
            CollectionKind::ReflectionProbes => &mut self.reflection_probes,
        }
    }

    fn collection_of(&self, handle: ObjectHandle) -> Option<CollectionKind> {
        self.get(handle).and_then(|o| CollectionKind::for_data(&o.data))
    }

    /// Whether the object is listed in its owning collection. Unsupported
    /// entities have no collection and count as present while they exist.
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        match self.collection_of(handle) {
            Some(kind) => self.collection(kind).contains(&handle),
            None => self.get(handle).is_some(),
        }
    }

    /// List the object in its owning collection. No-op if already listed.
    pub fn add_to_collection(&mut self, handle: ObjectHandle) -> bool {
        let Some(kind) = self.collection_of(handle) else {
            return false;
        };
        let list = self.collection_mut(kind);
        if list.contains(&handle) {
            return false;
        }
        list.push(handle);
        true
    }

    /// List the object at `index` (clamped to the collection length). No-op
    /// if already listed.
    pub fn insert_into_collection(&mut self, handle: ObjectHandle, index: usize) -> bool {
        let Some(kind) = self.collection_of(handle) else {
            return false;
        };
        let list = self.collection_mut(kind);
        if list.contains(&handle) {
            return false;
        }
        list.insert(index.min(list.len()), handle);
        true
    }

    /// Unlist the object from its owning collection, returning its former
    /// index. The object itself stays in the arena.
    pub fn remove_from_collection(&mut self, handle: ObjectHandle) -> Option<usize> {
        let kind = self.collection_of(handle)?;
        let list = self.collection_mut(kind);
        let index = list.iter().position(|&h| h == handle)?;
        list.remove(index);
        Some(index)
    }

    pub fn editor_camera(&self) -> Option<ObjectHandle> {
        self.editor_camera
    }

    pub fn set_editor_camera(&mut self, camera: Option<ObjectHandle>) {
        self.editor_camera = camera;
    }

    pub fn parent(&self, handle: ObjectHandle) -> Option<ObjectHandle> {
        self.get(handle).and_then(|o| o.parent)
    }

    /// Raw parent pointer assignment. Returns `false` for objects outside the
    /// hierarchy or unknown handles.
    pub fn set_parent(&mut self, handle: ObjectHandle, parent: Option<ObjectHandle>) -> bool {
        match self.get_mut(handle) {
            Some(object) if object.is_hierarchical() => {
                object.parent = parent;
                true
            }
            _ => false,
        }
    }

    /// Direct hierarchical children, in creation order.
    pub fn children(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.handles()
            .filter(|&h| {
                self.get(h)
                    .is_some_and(|o| o.is_hierarchical() && o.parent == Some(handle))
            })
            .collect()
    }

    /// All hierarchical descendants, depth first.
    pub fn descendants(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        let mut result = Vec::new();
        let mut stack = self.children(handle);
        stack.reverse();
        while let Some(h) = stack.pop() {
            if result.contains(&h) {
                continue;
            }
            result.push(h);
            let mut children = self.children(h);
            children.reverse();
            stack.extend(children);
        }
        result
    }

    /// Whether `ancestor` appears on the parent chain of `handle`.
    pub fn is_ancestor(&self, ancestor: ObjectHandle, handle: ObjectHandle) -> bool {
        let mut current = self.parent(handle);
        let mut steps = 0;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.objects.len() {
                log::warn!("Parent chain of {} does not terminate", handle);
                return false;
            }
            current = self.parent(p);
        }
        false
    }

    /// Listed hierarchical objects without a parent, in creation order.
    pub fn root_nodes(&self) -> Vec<ObjectHandle> {
        self.handles()
            .filter(|&h| {
                self.get(h)
                    .is_some_and(|o| o.is_hierarchical() && o.parent.is_none())
                    && self.contains(h)
            })
            .collect()
    }

    /// World matrix composed along the parent chain.
    pub fn world_matrix(&self, handle: ObjectHandle) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(handle);
        let mut steps = 0;
        while let Some(h) = current {
            let Some(object) = self.get(h) else { break };
            if let Some(t) = object.transform() {
                matrix = t.to_matrix() * matrix;
            }
            steps += 1;
            if steps > self.objects.len() {
                break;
            }
            current = object.parent;
        }
        matrix
    }

    /// Listed particle systems whose emitter is `handle`.
    pub fn particle_systems_emitted_by(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.particle_systems
            .iter()
            .copied()
            .filter(|&ps| {
                matches!(
                    self.get(ps).map(|o| &o.data),
                    Some(ObjectData::ParticleSystem(ParticleSystemData { emitter: Some(e) })) if *e == handle
                )
            })
            .collect()
    }

    /// Listed spatial sounds attached to `handle`.
    pub fn sounds_attached_to(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.sounds
            .iter()
            .copied()
            .filter(|&s| {
                matches!(
                    self.get(s).map(|o| &o.data),
                    Some(ObjectData::Sound(SoundData { spatial: true, attached_to: Some(m) })) if *m == handle
                )
            })
            .collect()
    }

    /// Listed reflection probes attached to `handle`.
    pub fn probes_attached_to(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.reflection_probes
            .iter()
            .copied()
            .filter(|&p| {
                matches!(
                    self.get(p).map(|o| &o.data),
                    Some(ObjectData::ReflectionProbe(ReflectionProbeData { attached_mesh: Some(m), .. })) if *m == handle
                )
            })
            .collect()
    }

    /// Lights whose shadow render list contains `mesh`, with the index it
    /// occupies in each list.
    pub fn shadow_lists_containing(&self, mesh: ObjectHandle) -> Vec<(ObjectHandle, usize)> {
        self.lights
            .iter()
            .filter_map(|&light| match self.get(light).map(|o| &o.data) {
                Some(ObjectData::Light(LightData {
                    shadow_render_list: Some(list),
                    ..
                })) => list.iter().position(|&m| m == mesh).map(|i| (light, i)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_spawn_lists_in_owning_collection() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("box");
        let sound = scene.add_sound("music");

        assert_eq!(scene.collection(CollectionKind::Meshes), &[mesh]);
        assert_eq!(scene.collection(CollectionKind::Sounds), &[sound]);
        assert!(scene.contains(mesh));
    }

    #[test]
    fn test_remove_keeps_object_in_arena() {
        let mut scene = Scene::new();
        let a = scene.add_light("a");
        let b = scene.add_light("b");

        assert_eq!(scene.remove_from_collection(a), Some(0));
        assert!(!scene.contains(a));
        assert!(scene.get(a).is_some());
        assert_eq!(scene.remove_from_collection(a), None);

        assert!(scene.add_to_collection(a));
        assert!(!scene.add_to_collection(a));
        assert_eq!(scene.collection(CollectionKind::Lights), &[b, a]);
    }

    #[test]
    fn test_insert_restores_position() {
        let mut scene = Scene::new();
        let a = scene.add_sound("a");
        let b = scene.add_sound("b");
        let c = scene.add_sound("c");

        let index = scene.remove_from_collection(b).unwrap();
        assert!(scene.insert_into_collection(b, index));
        assert!(!scene.insert_into_collection(b, 0));
        assert_eq!(scene.collection(CollectionKind::Sounds), &[a, b, c]);

        scene.remove_from_collection(c);
        assert!(scene.insert_into_collection(c, 10));
        assert_eq!(scene.collection(CollectionKind::Sounds), &[a, b, c]);
    }

    #[test]
    fn test_hierarchy_queries() {
        let mut scene = Scene::new();
        let root = scene.add_transform_node("root");
        let child = scene.add_mesh("child");
        let grandchild = scene.add_mesh("grandchild");
        let sound = scene.add_sound("music");

        scene.set_parent(child, Some(root));
        scene.set_parent(grandchild, Some(child));

        assert!(!scene.set_parent(sound, Some(root)));
        assert_eq!(scene.children(root), vec![child]);
        assert_eq!(scene.descendants(root), vec![child, grandchild]);
        assert_eq!(scene.root_nodes(), vec![root]);
        assert!(scene.is_ancestor(root, grandchild));
        assert!(!scene.is_ancestor(grandchild, root));
    }

    #[test]
    fn test_unsupported_entities_in_hierarchy() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("mesh");
        let gizmo = scene.spawn(SceneObject::new(
            "gizmo",
            ObjectData::Other {
                class_name: "GizmoManager".into(),
            },
        ));
        let free = scene.spawn(SceneObject::new(
            "sprites",
            ObjectData::Other {
                class_name: "SpriteManager".into(),
            },
        ));

        assert!(scene.set_parent(gizmo, Some(mesh)));
        assert_eq!(scene.children(mesh), vec![gizmo]);
        assert_eq!(scene.root_nodes(), vec![mesh, free]);
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let parent = scene.add_transform_node("parent");
        let child = scene.add_mesh("child");
        scene.set_parent(child, Some(parent));

        *scene.get_mut(parent).unwrap().transform_mut().unwrap() =
            Transform::new().with_position(Vec3::new(10.0, 0.0, 0.0));
        *scene.get_mut(child).unwrap().transform_mut().unwrap() =
            Transform::new().with_position(Vec3::new(0.0, 1.0, 0.0));

        let world = scene.world_matrix(child);
        assert!(world
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(10.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_attachment_queries() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("emitter");
        let ps = scene.add_particle_system("sparks", Some(mesh));
        let sound = scene.add_sound("hum");
        let probe = scene.add_reflection_probe("probe");
        let light = scene.add_light("sun");

        if let ObjectData::Sound(data) = &mut scene.get_mut(sound).unwrap().data {
            data.spatial = true;
            data.attached_to = Some(mesh);
        }
        if let ObjectData::ReflectionProbe(data) = &mut scene.get_mut(probe).unwrap().data {
            data.attached_mesh = Some(mesh);
        }
        if let ObjectData::Light(data) = &mut scene.get_mut(light).unwrap().data {
            data.shadow_render_list = Some(vec![mesh]);
        }

        assert_eq!(scene.particle_systems_emitted_by(mesh), vec![ps]);
        assert_eq!(scene.sounds_attached_to(mesh), vec![sound]);
        assert_eq!(scene.probes_attached_to(mesh), vec![probe]);
        assert_eq!(scene.shadow_lists_containing(mesh), vec![(light, 0)]);
    }
}
