//! Boolean editor flags kept in object metadata.

use serde_json::Value;
use void_scene::{ObjectHandle, Scene};

use crate::history::{CommandEntry, CommandStack};
use crate::session::EditorContext;

/// Excludes the object from scene export.
pub const METADATA_DO_NOT_EXPORT_KEY: &str = "doNotExport";
/// Protects the node from removal.
pub const METADATA_LOCKED_KEY: &str = "isLocked";

#[derive(Clone, Debug)]
struct FlagRecord {
    object: ObjectHandle,
    had_metadata: bool,
    previous: Option<Value>,
}

impl FlagRecord {
    fn restore(&self, scene: &mut Scene, key: &str) {
        let Some(object) = scene.get_mut(self.object) else {
            return;
        };
        match &self.previous {
            Some(value) => {
                object.metadata_mut().insert(key.to_string(), value.clone());
            }
            None => {
                if let Some(metadata) = &mut object.metadata {
                    metadata.remove(key);
                    if metadata.is_empty() && !self.had_metadata {
                        object.metadata = None;
                    }
                }
            }
        }
    }
}

fn set_metadata_flag(
    ctx: &mut EditorContext,
    history: &mut CommandStack<EditorContext>,
    objects: &[ObjectHandle],
    key: &'static str,
    value: bool,
) -> usize {
    let mut records = Vec::new();
    for &handle in objects {
        let Some(object) = ctx.scene.get_mut(handle) else {
            continue;
        };
        if object.metadata_value(key) == Some(&Value::Bool(value)) {
            continue;
        }
        records.push(FlagRecord {
            object: handle,
            had_metadata: object.metadata.is_some(),
            previous: object.metadata_value(key).cloned(),
        });
        object.set_metadata_flag(key, value);
    }

    if records.is_empty() {
        return 0;
    }

    let count = records.len();
    let redo_objects: Vec<ObjectHandle> = records.iter().map(|r| r.object).collect();
    history.push(
        CommandEntry::new(
            format!("Set {} to {}", key, value),
            move |ctx: &mut EditorContext| {
                for record in records.iter().rev() {
                    record.restore(&mut ctx.scene, key);
                }
            },
            move |ctx: &mut EditorContext| {
                for &object in &redo_objects {
                    if let Some(object) = ctx.scene.get_mut(object) {
                        object.set_metadata_flag(key, value);
                    }
                }
            },
        )
        .with_common(EditorContext::refresh),
    );

    log::info!("Set {} = {} on {} object(s)", key, value, count);
    ctx.refresh();
    count
}

/// Mark objects as excluded from (or included in) scene export.
pub fn set_do_not_export(
    ctx: &mut EditorContext,
    history: &mut CommandStack<EditorContext>,
    objects: &[ObjectHandle],
    value: bool,
) -> usize {
    set_metadata_flag(ctx, history, objects, METADATA_DO_NOT_EXPORT_KEY, value)
}

/// Lock or unlock nodes. Locked nodes are never removed.
pub fn set_locked(
    ctx: &mut EditorContext,
    history: &mut CommandStack<EditorContext>,
    objects: &[ObjectHandle],
    value: bool,
) -> usize {
    set_metadata_flag(ctx, history, objects, METADATA_LOCKED_KEY, value)
}
