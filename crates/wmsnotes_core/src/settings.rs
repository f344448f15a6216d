//! Window layout settings persisted between sessions.
//!
//! # Responsibility
//! - Load and save the persisted layout fields as a JSON document.
//!
//! # Invariants
//! - A missing file or missing field falls back to defaults.
//! - An unknown `window_state` value falls back to `normal`.
//! - Malformed JSON is reported, never silently replaced by defaults.

use log::{debug, error, info};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAIN_SPLIT_POSITION: i32 = 300;
pub const DEFAULT_EDITOR_VIEWER_SPLIT_POSITION: i32 = 400;

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "invalid settings file: {err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Maximized,
    #[default]
    Normal,
}

/// Persisted window layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "lenient_window_state")]
    pub window_state: WindowState,
    pub main_split_position: i32,
    pub editor_viewer_split_position: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_state: WindowState::Normal,
            main_split_position: DEFAULT_MAIN_SPLIT_POSITION,
            editor_viewer_split_position: DEFAULT_EDITOR_VIEWER_SPLIT_POSITION,
        }
    }
}

fn lenient_window_state<'de, D>(deserializer: D) -> Result<WindowState, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(WindowState::deserialize(value).unwrap_or_default())
}

/// JSON-file backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    config_file_path: PathBuf,
}

impl SettingsRepository {
    pub fn new(config_file_path: impl Into<PathBuf>) -> Self {
        let config_file_path = config_file_path.into();
        debug!(
            "event=settings_init module=settings status=ok path={}",
            config_file_path.display()
        );
        Self { config_file_path }
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_file_path
    }

    /// Reads settings, falling back to defaults when the file is absent.
    pub fn load(&self) -> SettingsResult<Settings> {
        let raw = match std::fs::read_to_string(&self.config_file_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("event=settings_load module=settings status=ok source=defaults");
                return Ok(Settings::default());
            }
            Err(err) => {
                error!(
                    "event=settings_load module=settings status=error error={}",
                    err
                );
                return Err(err.into());
            }
        };
        let settings = serde_json::from_str(&raw).map_err(|err| {
            error!(
                "event=settings_load module=settings status=error error_code=parse_failed error={}",
                err
            );
            SettingsError::from(err)
        })?;
        info!("event=settings_load module=settings status=ok source=file");
        Ok(settings)
    }

    /// Overwrites the settings file, creating its directory when needed.
    pub fn save(&self, settings: &Settings) -> SettingsResult<()> {
        if let Some(dir) = self.config_file_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let raw = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.config_file_path, raw)?;
        info!(
            "event=settings_save module=settings status=ok path={}",
            self.config_file_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsError, SettingsRepository, WindowState};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("settings.json"));
        let settings = repo.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.main_split_position, 300);
        assert_eq!(settings.editor_viewer_split_position, 400);
    }

    #[test]
    fn save_then_load_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("nested").join("settings.json"));
        let settings = Settings {
            window_state: WindowState::Maximized,
            main_split_position: 120,
            editor_viewer_split_position: 640,
        };
        repo.save(&settings).unwrap();
        assert_eq!(repo.load().unwrap(), settings);
    }

    #[test]
    fn unknown_window_state_and_missing_fields_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"window_state":"fullscreen","main_split_position":10}"#)
            .unwrap();

        let settings = SettingsRepository::new(&path).load().unwrap();
        assert_eq!(settings.window_state, WindowState::Normal);
        assert_eq!(settings.main_split_position, 10);
        assert_eq!(settings.editor_viewer_split_position, 400);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = SettingsRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
