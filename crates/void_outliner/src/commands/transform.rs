//! Copy and paste of transforms between nodes.

use glam::Vec3;
use void_scene::{ObjectHandle, Scene, Transform};

use crate::classify::classify;
use crate::history::{CommandEntry, CommandStack};
use crate::session::EditorContext;

/// Component of a transform to paste.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformPart {
    All,
    Position,
    Rotation,
    Scaling,
    /// Light direction. Only lights that have one take part.
    Direction,
}

impl TransformPart {
    pub fn name(&self) -> &'static str {
        match self {
            TransformPart::All => "transform",
            TransformPart::Position => "position",
            TransformPart::Rotation => "rotation",
            TransformPart::Scaling => "scaling",
            TransformPart::Direction => "direction",
        }
    }
}

/// Transform state of a node at one point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformSnapshot {
    pub transform: Transform,
    pub direction: Option<Vec3>,
}

impl TransformSnapshot {
    /// Snapshot of a node, `None` for kinds without a transform.
    pub fn capture(scene: &Scene, object: ObjectHandle) -> Option<Self> {
        let object = scene.get(object)?;
        if !classify(object).has_transform() {
            return None;
        }
        Some(Self {
            transform: *object.transform()?,
            direction: object.direction(),
        })
    }

    pub fn apply(&self, scene: &mut Scene, object: ObjectHandle) {
        let Some(object) = scene.get_mut(object) else {
            return;
        };
        if let Some(t) = object.transform_mut() {
            *t = self.transform;
        }
        if let Some(direction) = self.direction {
            object.set_direction(direction);
        }
    }

    /// This snapshot with `part` taken from `source`. Components missing on
    /// either side are left as they are.
    pub fn with_part_from(mut self, source: &TransformSnapshot, part: TransformPart) -> Self {
        let all = part == TransformPart::All;
        if all || part == TransformPart::Position {
            self.transform.position = source.transform.position;
        }
        if all || part == TransformPart::Rotation {
            self.transform.rotation = source.transform.rotation;
        }
        if all || part == TransformPart::Scaling {
            self.transform.scaling = source.transform.scaling;
        }
        if all || part == TransformPart::Direction {
            if let (Some(_), Some(direction)) = (self.direction, source.direction) {
                self.direction = Some(direction);
            }
        }
        self
    }
}

/// Paste `part` of the transform of `source` onto `target`. Returns
/// `false` when nothing changed.
pub fn paste_transform(
    ctx: &mut EditorContext,
    history: &mut CommandStack<EditorContext>,
    source: ObjectHandle,
    target: ObjectHandle,
    part: TransformPart,
) -> bool {
    let (Some(from), Some(before)) = (
        TransformSnapshot::capture(&ctx.scene, source),
        TransformSnapshot::capture(&ctx.scene, target),
    ) else {
        return false;
    };

    let after = before.with_part_from(&from, part);
    if after == before {
        return false;
    }

    after.apply(&mut ctx.scene, target);

    let name = ctx
        .scene
        .get(target)
        .map(|o| o.name.clone())
        .unwrap_or_default();
    let description = format!("Paste {} on \"{}\"", part.name(), name);
    log::info!("{}", description);

    history.push(
        CommandEntry::new(
            description,
            move |ctx: &mut EditorContext| before.apply(&mut ctx.scene, target),
            move |ctx: &mut EditorContext| after.apply(&mut ctx.scene, target),
        )
        .with_common(|ctx: &mut EditorContext| ctx.outliner.update()),
    );

    ctx.outliner.update();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use void_scene::{LightData, ObjectData};

    fn setup() -> (EditorContext, CommandStack<EditorContext>, ObjectHandle, ObjectHandle) {
        let mut ctx = EditorContext::new(Scene::new());
        let source = ctx.scene.add_mesh("source");
        let target = ctx.scene.add_transform_node("target");
        *ctx.scene.get_mut(source).unwrap().transform_mut().unwrap() = Transform::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Quat::from_rotation_y(1.0))
            .with_scaling(Vec3::splat(2.0));
        (ctx, CommandStack::new(), source, target)
    }

    fn transform(ctx: &EditorContext, object: ObjectHandle) -> Transform {
        *ctx.scene.get(object).unwrap().transform().unwrap()
    }

    #[test]
    fn test_paste_position_only() {
        let (mut ctx, mut history, source, target) = setup();

        assert!(paste_transform(&mut ctx, &mut history, source, target, TransformPart::Position));

        let t = transform(&ctx, target);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scaling, Vec3::ONE);
        assert_eq!(history.undo_description(), Some("Paste position on \"target\""));
    }

    #[test]
    fn test_paste_all_is_one_step() {
        let (mut ctx, mut history, source, target) = setup();

        paste_transform(&mut ctx, &mut history, source, target, TransformPart::All);
        assert_eq!(transform(&ctx, target), transform(&ctx, source));
        assert_eq!(history.len(), 1);

        history.undo(&mut ctx);
        assert_eq!(transform(&ctx, target), Transform::IDENTITY);
        assert!(ctx.outliner.take_dirty());
    }

    #[test]
    fn test_direction_needs_both_sides() {
        let (mut ctx, mut history, source, _) = setup();
        let sun = ctx.scene.spawn(void_scene::SceneObject::new(
            "sun",
            ObjectData::Light(LightData {
                direction: Some(Vec3::NEG_Y),
                ..Default::default()
            }),
        ));
        let moon = ctx.scene.spawn(void_scene::SceneObject::new(
            "moon",
            ObjectData::Light(LightData {
                direction: Some(Vec3::X),
                ..Default::default()
            }),
        ));

        assert!(!paste_transform(&mut ctx, &mut history, source, sun, TransformPart::Direction));
        assert!(paste_transform(&mut ctx, &mut history, moon, sun, TransformPart::Direction));
        assert_eq!(ctx.scene.get(sun).unwrap().direction(), Some(Vec3::X));

        history.undo(&mut ctx);
        assert_eq!(ctx.scene.get(sun).unwrap().direction(), Some(Vec3::NEG_Y));
    }

    #[test]
    fn test_non_transform_kinds_are_ignored() {
        let (mut ctx, mut history, source, _) = setup();
        let sound = ctx.scene.add_sound("music");

        assert!(!paste_transform(&mut ctx, &mut history, source, sound, TransformPart::All));
        assert!(!paste_transform(&mut ctx, &mut history, sound, source, TransformPart::All));
        assert!(history.is_empty());
    }
}
