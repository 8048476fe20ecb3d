//! Scene objects and their per-kind data.

use glam::{Mat4, Quat, Vec3};
use serde_json::Value;

use crate::ObjectHandle;

/// Open key/value bag attached to an object.
pub type Metadata = serde_json::Map<String, Value>;

/// Local transform of a node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scaling: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scaling: Vec3::ONE,
    };

    pub fn new() -> Self {
        Self::IDENTITY
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scaling(mut self, scaling: Vec3) -> Self {
        self.scaling = scaling;
        self
    }

    /// Local matrix (scale, then rotate, then translate).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scaling, self.rotation, self.position)
    }

    /// Decompose an affine matrix back into a transform.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scaling, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scaling,
        }
    }
}

/// One level-of-detail alternate owned by a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct LodLevel {
    pub distance: f32,
    /// `None` means "render nothing past this distance".
    pub mesh: Option<ObjectHandle>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub transform: Transform,
    /// Set on LOD proxies generated from another mesh. Such meshes are
    /// instances-of-instances and never shown on their own.
    pub master_mesh: Option<ObjectHandle>,
    pub lod_levels: Vec<LodLevel>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightData {
    pub transform: Transform,
    pub direction: Option<Vec3>,
    /// Render list of the light's shadow generator, when it casts shadows.
    pub shadow_render_list: Option<Vec<ObjectHandle>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraData {
    pub transform: Transform,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSystemData {
    pub emitter: Option<ObjectHandle>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoundData {
    pub spatial: bool,
    pub attached_to: Option<ObjectHandle>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReflectionProbeData {
    pub attached_mesh: Option<ObjectHandle>,
    pub cube_texture_name: String,
}

/// Kind-specific payload. The variant is the object's type discriminator.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectData {
    TransformNode(Transform),
    Mesh(MeshData),
    Light(LightData),
    Camera(CameraData),
    ParticleSystem(ParticleSystemData),
    Sound(SoundData),
    ReflectionProbe(ReflectionProbeData),
    /// Engine entity the editor has no dedicated support for.
    Other { class_name: String },
}

/// A live object of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub name: String,
    /// Native persistent id. Only node kinds carry one; sounds and
    /// reflection probes keep a synthetic id in their metadata instead.
    pub id: Option<String>,
    /// Structural parent, meaningful for node kinds only.
    pub parent: Option<ObjectHandle>,
    /// Lazily created, see [`SceneObject::metadata_mut`].
    pub metadata: Option<Metadata>,
    /// Transient objects (editor helpers, removed objects) are not saved
    /// and not listed.
    pub do_not_serialize: bool,
    pub enabled: bool,
    pub data: ObjectData,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, data: ObjectData) -> Self {
        Self {
            name: name.into(),
            id: None,
            parent: None,
            metadata: None,
            do_not_serialize: false,
            enabled: true,
            data,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, parent: ObjectHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Engine class name, the stable type tag of this object.
    pub fn class_name(&self) -> &str {
        match &self.data {
            ObjectData::TransformNode(_) => "TransformNode",
            ObjectData::Mesh(_) => "Mesh",
            ObjectData::Light(_) => "Light",
            ObjectData::Camera(_) => "Camera",
            ObjectData::ParticleSystem(_) => "ParticleSystem",
            ObjectData::Sound(_) => "Sound",
            ObjectData::ReflectionProbe(_) => "ReflectionProbe",
            ObjectData::Other { class_name } => class_name,
        }
    }

    /// Whether the object participates in the parent/children hierarchy.
    /// Unsupported entities keep their parent pointer even though nothing
    /// can be parented to them through the outliner.
    pub fn is_hierarchical(&self) -> bool {
        matches!(
            self.data,
            ObjectData::TransformNode(_)
                | ObjectData::Mesh(_)
                | ObjectData::Light(_)
                | ObjectData::Camera(_)
                | ObjectData::Other { .. }
        )
    }

    pub fn transform(&self) -> Option<&Transform> {
        match &self.data {
            ObjectData::TransformNode(t) => Some(t),
            ObjectData::Mesh(m) => Some(&m.transform),
            ObjectData::Light(l) => Some(&l.transform),
            ObjectData::Camera(c) => Some(&c.transform),
            _ => None,
        }
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        match &mut self.data {
            ObjectData::TransformNode(t) => Some(t),
            ObjectData::Mesh(m) => Some(&mut m.transform),
            ObjectData::Light(l) => Some(&mut l.transform),
            ObjectData::Camera(c) => Some(&mut c.transform),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Vec3> {
        match &self.data {
            ObjectData::Light(l) => l.direction,
            _ => None,
        }
    }

    pub fn set_direction(&mut self, direction: Vec3) -> bool {
        match &mut self.data {
            ObjectData::Light(LightData {
                direction: Some(d), ..
            }) => {
                *d = direction;
                true
            }
            _ => false,
        }
    }

    /// Metadata bag, created on first access. Existing entries are kept.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.metadata.get_or_insert_with(Metadata::new)
    }

    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }

    /// Boolean metadata entry, `false` when absent or not a boolean.
    pub fn metadata_flag(&self, key: &str) -> bool {
        self.metadata_value(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_metadata_flag(&mut self, key: &str, value: bool) {
        self.metadata_mut().insert(key.to_string(), Value::Bool(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_is_type_tag() {
        let mesh = SceneObject::new("box", ObjectData::Mesh(MeshData::default()));
        let other = SceneObject::new(
            "sprite",
            ObjectData::Other {
                class_name: "SpriteManager".into(),
            },
        );

        assert_eq!(mesh.class_name(), "Mesh");
        assert_eq!(other.class_name(), "SpriteManager");
        assert!(mesh.is_hierarchical());
        assert!(other.is_hierarchical());
        let sound = SceneObject::new("music", ObjectData::Sound(SoundData::default()));
        assert!(!sound.is_hierarchical());
    }

    #[test]
    fn test_metadata_created_lazily_and_kept() {
        let mut sound = SceneObject::new("music", ObjectData::Sound(SoundData::default()));
        assert!(sound.metadata.is_none());
        assert!(!sound.metadata_flag("isLocked"));

        sound.set_metadata_flag("isLocked", true);
        sound.metadata_mut();

        assert!(sound.metadata_flag("isLocked"));
    }

    #[test]
    fn test_transform_matrix_roundtrip() {
        let t = Transform::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Quat::from_rotation_y(0.5))
            .with_scaling(Vec3::splat(2.0));

        let back = Transform::from_matrix(t.to_matrix());

        assert!(back.position.abs_diff_eq(t.position, 1e-5));
        assert!(back.scaling.abs_diff_eq(t.scaling, 1e-5));
        assert!(back.rotation.abs_diff_eq(t.rotation, 1e-5));
    }

    #[test]
    fn test_direction_only_on_directional_lights() {
        let mut light = SceneObject::new(
            "sun",
            ObjectData::Light(LightData {
                direction: Some(Vec3::NEG_Y),
                ..Default::default()
            }),
        );
        let mut point = SceneObject::new("bulb", ObjectData::Light(LightData::default()));

        assert!(light.set_direction(Vec3::X));
        assert_eq!(light.direction(), Some(Vec3::X));
        assert!(!point.set_direction(Vec3::X));
    }
}
