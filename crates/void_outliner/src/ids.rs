//! Outliner identity of scene objects.
//!
//! Node kinds carry a native id. Sounds and reflection probes have no id
//! field, so theirs lives in the metadata bag under [`METADATA_ID_KEY`].
//! Every lookup goes through this module so both schemes share the same
//! lazy, idempotent assignment.

use serde_json::Value;
use uuid::Uuid;
use void_scene::{ObjectHandle, Scene, SceneObject};

use crate::classify::{classify, NodeKind};

/// Metadata key holding the synthetic id of objects without a native one.
pub const METADATA_ID_KEY: &str = "id";

/// Generate a new random id.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

fn uses_synthetic_id(object: &SceneObject) -> bool {
    matches!(classify(object), NodeKind::Sound | NodeKind::ReflectionProbe)
}

/// Current id of an object, without assigning one.
pub fn object_id(object: &SceneObject) -> Option<&str> {
    if uses_synthetic_id(object) {
        object.metadata_value(METADATA_ID_KEY).and_then(Value::as_str)
    } else {
        object.id.as_deref()
    }
}

/// Id of the object, assigned on first sight. An id that is already present
/// is never overwritten.
pub fn ensure_object_id(scene: &mut Scene, handle: ObjectHandle) -> Option<String> {
    let object = scene.get_mut(handle)?;
    if let Some(id) = object_id(object) {
        return Some(id.to_string());
    }

    let id = fresh_id();
    if uses_synthetic_id(object) {
        object
            .metadata_mut()
            .insert(METADATA_ID_KEY.to_string(), Value::String(id.clone()));
    } else {
        object.id = Some(id.clone());
    }
    Some(id)
}

/// Replace the object's id with a fresh one.
pub fn reassign_id(object: &mut SceneObject) -> String {
    let id = fresh_id();
    if uses_synthetic_id(object) {
        object
            .metadata_mut()
            .insert(METADATA_ID_KEY.to_string(), Value::String(id.clone()));
    } else {
        object.id = Some(id.clone());
    }
    id
}

/// Find a listed object by outliner id.
pub fn find_by_id(scene: &Scene, id: &str) -> Option<ObjectHandle> {
    scene
        .handles()
        .find(|&h| scene.contains(h) && scene.get(h).and_then(object_id) == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_id_assigned_once() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh("box");

        let first = ensure_object_id(&mut scene, mesh).unwrap();
        let second = ensure_object_id(&mut scene, mesh).unwrap();

        assert_eq!(first, second);
        assert_eq!(scene.get(mesh).unwrap().id.as_deref(), Some(first.as_str()));
        assert!(scene.get(mesh).unwrap().metadata.is_none());
    }

    #[test]
    fn test_synthetic_id_lives_in_metadata() {
        let mut scene = Scene::new();
        let sound = scene.add_sound("music");

        let first = ensure_object_id(&mut scene, sound).unwrap();
        let second = ensure_object_id(&mut scene, sound).unwrap();

        assert_eq!(first, second);
        assert!(scene.get(sound).unwrap().id.is_none());
        assert_eq!(
            scene.get(sound).unwrap().metadata_value(METADATA_ID_KEY),
            Some(&Value::String(first.clone()))
        );
        assert_eq!(find_by_id(&scene, &first), Some(sound));
    }

    #[test]
    fn test_existing_metadata_is_kept() {
        let mut scene = Scene::new();
        let probe = scene.add_reflection_probe("probe");
        scene
            .get_mut(probe)
            .unwrap()
            .set_metadata_flag("isLocked", true);

        ensure_object_id(&mut scene, probe);

        let object = scene.get(probe).unwrap();
        assert!(object.metadata_flag("isLocked"));
        assert!(object_id(object).is_some());
    }

    #[test]
    fn test_reassign_changes_id() {
        let mut scene = Scene::new();
        let light = scene.add_light("sun");
        let before = ensure_object_id(&mut scene, light).unwrap();

        let after = reassign_id(scene.get_mut(light).unwrap());

        assert_ne!(before, after);
        assert_eq!(find_by_id(&scene, &after), Some(light));
        assert_eq!(find_by_id(&scene, &before), None);
    }
}
