use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::provider::Session;

/// File-based session storage.
/// The session is kept as JSON in the user's config directory.
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store the session, creating the parent directory if needed
    pub fn store(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        fs::write(&self.path, &json).context("Failed to write session file")?;

        tracing::info!("Stored session for user {} at {:?}", session.user.id, self.path);
        Ok(())
    }

    /// Retrieve the stored session. A missing file is `Ok(None)`.
    pub fn retrieve(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).context("Failed to read session file")?;

        let session: Session =
            serde_json::from_str(&json).context("Failed to deserialize session")?;

        Ok(Some(session))
    }

    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete session file")?;
            tracing::info!("Deleted session file {:?}", self.path);
        }

        Ok(())
    }
}
