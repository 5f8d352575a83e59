use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// File-backed storage for the explicit theme choice.
///
/// An absent file means the user never chose; callers then follow the
/// platform preference.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the saved choice. Unreadable or unknown contents count as unset.
    pub fn load(&self) -> Option<Theme> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match contents.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            other => {
                tracing::warn!("Ignoring unknown theme preference: {:?}", other);
                None
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create theme directory")?;
        }

        fs::write(&self.path, theme.as_str()).context("Failed to write theme preference")?;

        tracing::debug!("Stored theme preference: {}", theme.as_str());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete theme preference")?;
        }
        Ok(())
    }
}
