//! Outliner preferences.
//!
//! Persistent settings that survive editor restarts, stored as TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::history::CommandStack;

/// Outliner preferences and settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlinerPreferences {
    /// Maximum number of undo steps kept
    pub history_size: usize,
    /// Whether moved meshes and transform nodes keep their world transform
    pub keep_world_transform_on_move: bool,
    pub case_sensitive_filter: bool,
}

impl Default for OutlinerPreferences {
    fn default() -> Self {
        Self {
            history_size: CommandStack::<()>::DEFAULT_MAX_SIZE,
            keep_world_transform_on_move: true,
            case_sensitive_filter: false,
        }
    }
}

impl OutlinerPreferences {
    /// Load preferences from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let preferences = toml::from_str(&content)?;
        log::info!("Loaded outliner preferences from {:?}", path);
        Ok(preferences)
    }

    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring outliner preferences at {:?}: {}", path, e);
            Self::default()
        })
    }

    /// Save preferences to a file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        log::info!("Saved outliner preferences to {:?}", path);
        Ok(())
    }

    /// Get the default preferences path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("void_editor");
            p.push("outliner.toml");
            p
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutlinerError;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor").join("outliner.toml");
        let preferences = OutlinerPreferences {
            history_size: 12,
            keep_world_transform_on_move: false,
            case_sensitive_filter: true,
        };

        preferences.save(&path).unwrap();

        assert_eq!(OutlinerPreferences::load(&path).unwrap(), preferences);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outliner.toml");
        std::fs::write(&path, "history_size = 7\n").unwrap();

        let preferences = OutlinerPreferences::load(&path).unwrap();

        assert_eq!(preferences.history_size, 7);
        assert!(preferences.keep_world_transform_on_move);
        assert!(!preferences.case_sensitive_filter);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outliner.toml");
        std::fs::write(&path, "history_size = \"many\"").unwrap();

        assert!(matches!(
            OutlinerPreferences::load(&path),
            Err(OutlinerError::PreferencesParse(_))
        ));
        assert_eq!(
            OutlinerPreferences::load_or_default(&path),
            OutlinerPreferences::default()
        );
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = OutlinerPreferences::default_path() {
            assert!(path.ends_with("void_editor/outliner.toml"));
        }
    }
}
