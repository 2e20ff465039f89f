use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{io_error, Result, StoreError};
use crate::models::Project;

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR_NAME: &str = "SixteenCoreCharacterMapper";

/// Languages the application ships text for: (code, native name).
pub const LANGUAGES: [(&str, &str); 9] = [
    ("en", "English"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("es", "Español"),
    ("pt", "Português"),
    ("it", "Italiano"),
    ("nl", "Nederlands"),
    ("pl", "Polski"),
    ("el", "Ελληνικά"),
];

/// Map a language code onto a supported one, defaulting to English.
pub fn normalize_language(code: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(c, _)| *c)
        .unwrap_or("en")
}

/// Per-user preferences, independent of any project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppSettings {
    #[serde(alias = "isDarkMode")]
    pub is_dark_mode: bool,
    #[serde(alias = "languageCode")]
    pub language_code: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            is_dark_mode: true,
            language_code: "en".to_string(),
        }
    }
}

impl AppSettings {
    /// Record the session language on a project about to be saved.
    pub fn stamp(&self, project: &mut Project) {
        project.selected_language = self.language_code.clone();
    }
}

/// Reads and writes `settings.json`.
///
/// Settings are best effort: a missing or unreadable file yields defaults and
/// a failed write is logged rather than surfaced as fatal.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store inside `dir`, which is created on first save.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SETTINGS_FILE),
        }
    }

    /// Store in the platform's local data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", APP_DIR_NAME).ok_or_else(|| {
            StoreError::Io {
                path: PathBuf::from(APP_DIR_NAME),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not determine data directory",
                ),
            }
        })?;
        Ok(Self::in_dir(dirs.data_local_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> AppSettings {
        match self.try_load() {
            Ok(Some(mut settings)) => {
                settings.language_code = normalize_language(&settings.language_code).to_string();
                settings
            }
            Ok(None) => AppSettings::default(),
            Err(e) => {
                tracing::warn!("ignoring unreadable settings: {}", e);
                AppSettings::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<AppSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path).map_err(io_error(&self.path))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Persist settings. Returns whether the write succeeded.
    pub fn save(&self, settings: &AppSettings) -> bool {
        match self.try_save(settings) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("could not save settings: {}", e);
                false
            }
        }
    }

    fn try_save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let json = serde_json::to_string(settings)?;
        std::fs::write(&self.path, json).map_err(io_error(&self.path))
    }
}
