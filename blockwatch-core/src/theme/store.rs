use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::ThemeId;
use crate::error::{BlockwatchError, BlockwatchResult};

/// On-disk shape of the theme preference: `theme = "tva"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThemePreference {
    #[serde(default)]
    theme: String,
}

/// Persists the active theme id. This is the only state Blockwatch keeps
/// between runs.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blockwatch")
            .join("theme.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored preference. A missing file yields `Ok(None)`.
    pub fn load(&self) -> BlockwatchResult<Option<ThemeId>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            BlockwatchError::ThemePersistence(format!("read {:?}: {}", self.path, e))
        })?;
        let preference: ThemePreference = toml::from_str(&contents)?;
        preference.theme.parse::<ThemeId>().map(Some)
    }

    pub fn save(&self, theme: ThemeId) -> BlockwatchResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BlockwatchError::ThemePersistence(format!("create {:?}: {}", parent, e))
            })?;
        }

        let contents = toml::to_string_pretty(&ThemePreference {
            theme: theme.as_str().to_string(),
        })?;

        fs::write(&self.path, contents).map_err(|e| {
            BlockwatchError::ThemePersistence(format!("write {:?}: {}", self.path, e))
        })
    }

    /// The stored theme, or the default when nothing usable is stored.
    pub fn load_or_default(&self) -> ThemeId {
        match self.load() {
            Ok(Some(theme)) => theme,
            Ok(None) => ThemeId::default(),
            Err(e) => {
                warn!(
                    "Ignoring theme preference at {:?}: {}; using '{}'",
                    self.path,
                    e,
                    ThemeId::default()
                );
                ThemeId::default()
            }
        }
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}
