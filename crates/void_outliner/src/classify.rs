//! Node classification.
//!
//! Every object is placed into one [`NodeKind`] by looking at the type
//! discriminator it exposes. Call sites match on the kind instead of probing
//! object fields, so adding a kind is a compile-checked change.

use void_scene::{ObjectData, SceneObject};

/// Fixed categories of objects shown in the outliner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The scene itself (pseudo-root rows).
    Scene,
    TransformNode,
    Mesh,
    Light,
    Camera,
    ParticleSystem,
    Sound,
    ReflectionProbe,
    /// Could not be classified. Treated as an inert leaf.
    Unknown,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Scene => "Scene",
            NodeKind::TransformNode => "Transform Node",
            NodeKind::Mesh => "Mesh",
            NodeKind::Light => "Light",
            NodeKind::Camera => "Camera",
            NodeKind::ParticleSystem => "Particle System",
            NodeKind::Sound => "Sound",
            NodeKind::ReflectionProbe => "Reflection Probe",
            NodeKind::Unknown => "Unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NodeKind::Scene => "[S]",
            NodeKind::TransformNode => "[T]",
            NodeKind::Mesh => "[M]",
            NodeKind::Light => "[L]",
            NodeKind::Camera => "[C]",
            NodeKind::ParticleSystem => "[P]",
            NodeKind::Sound => "[A]",
            NodeKind::ReflectionProbe => "[R]",
            NodeKind::Unknown => "[?]",
        }
    }

    /// Node-like: has a parent pointer and hierarchical children.
    pub fn is_node(&self) -> bool {
        matches!(
            self,
            NodeKind::TransformNode | NodeKind::Mesh | NodeKind::Light | NodeKind::Camera
        )
    }

    /// Mesh-like: a transform node that can keep its world transform when
    /// reparented.
    pub fn is_transform_node(&self) -> bool {
        matches!(self, NodeKind::TransformNode | NodeKind::Mesh)
    }

    pub fn is_draggable(&self) -> bool {
        match self {
            NodeKind::TransformNode
            | NodeKind::Mesh
            | NodeKind::Light
            | NodeKind::Camera
            | NodeKind::ParticleSystem
            | NodeKind::Sound
            | NodeKind::ReflectionProbe => true,
            NodeKind::Scene | NodeKind::Unknown => false,
        }
    }

    pub fn is_cloneable(&self) -> bool {
        self.is_node()
    }

    /// Kinds whose transform can be copied and pasted.
    pub fn has_transform(&self) -> bool {
        self.is_node()
    }

    /// Whether an object of this kind can be attached under `target`
    /// (`None` meaning the scene root).
    pub fn can_attach_to(&self, target: Option<NodeKind>) -> bool {
        match (self, target) {
            (k, None) if k.is_node() => true,
            (k, Some(t)) if k.is_node() => t.is_node(),
            (NodeKind::ParticleSystem, Some(NodeKind::Mesh)) => true,
            (NodeKind::Sound, None) => true,
            (NodeKind::Sound, Some(t)) => t.is_transform_node(),
            (NodeKind::ReflectionProbe, None) => true,
            (NodeKind::ReflectionProbe, Some(NodeKind::Mesh)) => true,
            _ => false,
        }
    }
}

/// Classify an object by its type discriminator.
pub fn classify(object: &SceneObject) -> NodeKind {
    match &object.data {
        ObjectData::TransformNode(_) => NodeKind::TransformNode,
        ObjectData::Mesh(_) => NodeKind::Mesh,
        ObjectData::Light(_) => NodeKind::Light,
        ObjectData::Camera(_) => NodeKind::Camera,
        ObjectData::ParticleSystem(_) => NodeKind::ParticleSystem,
        ObjectData::Sound(_) => NodeKind::Sound,
        ObjectData::ReflectionProbe(_) => NodeKind::ReflectionProbe,
        ObjectData::Other { .. } => NodeKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_scene::{MeshData, SoundData};

    #[test]
    fn test_classify_by_discriminator() {
        let mesh = SceneObject::new("m", ObjectData::Mesh(MeshData::default()));
        let sound = SceneObject::new("s", ObjectData::Sound(SoundData::default()));
        let gui = SceneObject::new(
            "gui",
            ObjectData::Other {
                class_name: "AdvancedDynamicTexture".into(),
            },
        );

        assert_eq!(classify(&mesh), NodeKind::Mesh);
        assert_eq!(classify(&sound), NodeKind::Sound);
        assert_eq!(classify(&gui), NodeKind::Unknown);
    }

    #[test]
    fn test_unknown_is_inert() {
        assert!(!NodeKind::Unknown.is_node());
        assert!(!NodeKind::Unknown.is_draggable());
        assert!(!NodeKind::Unknown.can_attach_to(None));
        assert!(!NodeKind::Unknown.can_attach_to(Some(NodeKind::Mesh)));
    }

    #[test]
    fn test_attachment_rules() {
        assert!(NodeKind::Light.can_attach_to(Some(NodeKind::Mesh)));
        assert!(NodeKind::Mesh.can_attach_to(None));
        assert!(!NodeKind::Mesh.can_attach_to(Some(NodeKind::Sound)));

        assert!(NodeKind::ParticleSystem.can_attach_to(Some(NodeKind::Mesh)));
        assert!(!NodeKind::ParticleSystem.can_attach_to(Some(NodeKind::Light)));
        assert!(!NodeKind::ParticleSystem.can_attach_to(None));

        assert!(NodeKind::Sound.can_attach_to(Some(NodeKind::TransformNode)));
        assert!(!NodeKind::Sound.can_attach_to(Some(NodeKind::Camera)));

        assert!(NodeKind::ReflectionProbe.can_attach_to(None));
        assert!(!NodeKind::ReflectionProbe.can_attach_to(Some(NodeKind::TransformNode)));
    }
}
