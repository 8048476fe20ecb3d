use void_scene::{ObjectData, ObjectHandle, Scene};

use crate::history::{CommandEntry, CommandStack};
use crate::session::EditorContext;

fn set_name(scene: &mut Scene, object: ObjectHandle, name: &str) {
    let Some(object) = scene.get_mut(object) else {
        return;
    };
    object.name = name.to_string();
    // The probe's render target carries the same name.
    if let ObjectData::ReflectionProbe(data) = &mut object.data {
        data.cube_texture_name = name.to_string();
    }
}

/// Rename an object. Returns `false` when nothing changed.
pub fn rename(
    ctx: &mut EditorContext,
    history: &mut CommandStack<EditorContext>,
    object: ObjectHandle,
    name: impl Into<String>,
) -> bool {
    let name = name.into();
    let Some(old_name) = ctx.scene.get(object).map(|o| o.name.clone()) else {
        return false;
    };
    if old_name == name {
        return false;
    }

    set_name(&mut ctx.scene, object, &name);
    log::info!("Renamed \"{}\" to \"{}\"", old_name, name);

    history.push(
        CommandEntry::new(
            "Rename",
            move |ctx: &mut EditorContext| set_name(&mut ctx.scene, object, &old_name),
            move |ctx: &mut EditorContext| set_name(&mut ctx.scene, object, &name),
        )
        .with_common(EditorContext::refresh),
    );

    ctx.refresh();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_texture_name(scene: &Scene, probe: ObjectHandle) -> String {
        match &scene.get(probe).unwrap().data {
            ObjectData::ReflectionProbe(data) => data.cube_texture_name.clone(),
            other => panic!("not a probe: {:?}", other),
        }
    }

    #[test]
    fn test_rename_and_undo() {
        let mut ctx = EditorContext::new(Scene::new());
        let mut history = CommandStack::new();
        let mesh = ctx.scene.add_mesh("box");

        assert!(rename(&mut ctx, &mut history, mesh, "crate"));
        assert_eq!(ctx.outliner.tree().find(mesh.into()).unwrap().label, "crate");

        history.undo(&mut ctx);
        assert_eq!(ctx.scene.get(mesh).unwrap().name, "box");
        assert_eq!(ctx.outliner.tree().find(mesh.into()).unwrap().label, "box");
    }

    #[test]
    fn test_probe_texture_follows_name() {
        let mut ctx = EditorContext::new(Scene::new());
        let mut history = CommandStack::new();
        let probe = ctx.scene.add_reflection_probe("probe");

        rename(&mut ctx, &mut history, probe, "hall probe");
        assert_eq!(cube_texture_name(&ctx.scene, probe), "hall probe");

        history.undo(&mut ctx);
        assert_eq!(cube_texture_name(&ctx.scene, probe), "probe");

        history.redo(&mut ctx);
        assert_eq!(cube_texture_name(&ctx.scene, probe), "hall probe");
    }

    #[test]
    fn test_same_name_records_nothing() {
        let mut ctx = EditorContext::new(Scene::new());
        let mut history = CommandStack::new();
        let light = ctx.scene.add_light("sun");

        assert!(!rename(&mut ctx, &mut history, light, "sun"));
        assert!(!rename(&mut ctx, &mut history, ObjectHandle(42), "moon"));
        assert!(history.is_empty());
    }
}
