//! Editor settings - persisted host configuration.
//!
//! Settings are loaded from a TOML file in the user's config directory. A
//! missing or unreadable file yields defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, StoreError};

// =============================================================================
// ROOT SETTINGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Exit transition timing for popups and menus.
    pub transitions: TransitionSettings,

    /// Fallback values used when nothing is stored yet.
    pub defaults: DefaultSettings,

    /// Preference storage location.
    pub storage: StorageSettings,
}

impl Settings {
    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(settings) => settings,
            Err(error) => {
                warn!(%error, path = %path.display(), "using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific path. A missing file is not an error.
    pub fn try_load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(toml::from_str(&content)?)
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                operation: "create directory for",
                path: path.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| StoreError::Io {
            operation: "write",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "Pagecraft", "Pagecraft")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Storage file location: the configured path or the data directory.
    pub fn storage_path(&self) -> PathBuf {
        self.storage.path.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("org", "Pagecraft", "Pagecraft")
                .map(|dirs| dirs.data_dir().join("storage.json"))
                .unwrap_or_else(|| PathBuf::from("storage.json"))
        })
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Popup exit animation in milliseconds.
    pub popup_ms: u64,
    /// Menu exit animation in milliseconds.
    pub menu_ms: u64,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            popup_ms: 200,
            menu_ms: 100,
        }
    }
}

impl TransitionSettings {
    pub fn popup(&self) -> Duration {
        Duration::from_millis(self.popup_ms)
    }

    pub fn menu(&self) -> Duration {
        Duration::from_millis(self.menu_ms)
    }

    /// No exit animations at all.
    pub fn instant() -> Self {
        Self {
            popup_ms: 0,
            menu_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    /// Built-in cover used after logout and for new accounts.
    pub cover: u32,
    /// Gateway used when none is stored.
    pub gateway: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            cover: 1,
            gateway: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Storage file; the platform data directory when unset.
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::try_load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.transitions.popup(), Duration::from_millis(200));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[transitions]\nmenu_ms = 0\n").unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.transitions.menu_ms, 0);
        assert_eq!(settings.transitions.popup_ms, 200);
        assert_eq!(settings.defaults.cover, 1);
    }

    #[test]
    fn invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "transitions = 5").unwrap();
        assert!(Settings::try_load_from(&path).is_err());
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("settings.toml");
        let mut settings = Settings::default();
        settings.defaults.gateway = "http://127.0.0.1:47800".to_string();
        settings.storage.path = Some(dir.path().join("storage.json"));
        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.storage_path(), dir.path().join("storage.json"));
    }
}
