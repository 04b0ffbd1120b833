//! User settings stored in `~/.refsort/config.json`.
//!
//! Fields are optional so a partial file (or a newer one with keys this
//! version does not know) still loads. Saving merges with what is on disk.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::list::InsertMode;
use crate::session::Preferences;

/// Preference toggles as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Insert new entries at the start of the list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend: Option<bool>,

    /// Include an HTML rendering with hyperlinks when exporting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_with_links: Option<bool>,
}

impl Settings {
    /// Resolve the toggles, applying defaults for unset ones.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences {
            insert_mode: InsertMode::from_prepend(self.prepend.unwrap_or(false)),
            copy_with_links: self.copy_with_links.unwrap_or(false),
        }
    }

    /// Overlay the fields set in `other` onto these settings.
    #[must_use]
    pub fn merged(self, other: &Self) -> Self {
        Self {
            prepend: other.prepend.or(self.prepend),
            copy_with_links: other.copy_with_links.or(self.copy_with_links),
        }
    }
}

/// Load settings from `path`, defaulting when the file does not exist.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read or parsed.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Merge `changes` into the settings at `path` and write them back.
///
/// Returns the merged settings.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read, parsed or written.
pub fn save_settings(path: &Path, changes: &Settings) -> Result<Settings> {
    let settings = load_settings(path)?.merged(changes);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
    }

    let content = serde_json::to_string_pretty(&settings)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    fs::write(path, content)
        .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("config.json")).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.preferences(), Preferences::default());
    }

    #[test]
    fn test_save_merges_with_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        save_settings(
            &path,
            &Settings {
                prepend: Some(true),
                copy_with_links: None,
            },
        )
        .unwrap();
        let merged = save_settings(
            &path,
            &Settings {
                prepend: None,
                copy_with_links: Some(true),
            },
        )
        .unwrap();

        assert_eq!(merged.prepend, Some(true));
        assert_eq!(load_settings(&path).unwrap(), merged);
        assert_eq!(merged.preferences().insert_mode, InsertMode::Prepend);
        assert!(merged.preferences().copy_with_links);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"copyWithLinks": true, "theme": "dark"}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.copy_with_links, Some(true));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_settings(&path), Err(Error::Config(_))));
    }
}
