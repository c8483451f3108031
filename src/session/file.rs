//! JSON file backed [`SessionStore`].

use super::{Session, SessionStore};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk layout: `{"default": "TV", "sessions": [{...}, ...]}`
#[derive(Debug, Deserialize)]
struct SessionFile {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    sessions: Vec<Session>,
}

/// Reads sessions from a JSON file on every call, so edits apply to the next request.
#[derive(Clone, Debug)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    /// Create a store reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SessionFile> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Session(format!(
                "failed to read session file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::Session(format!(
                "failed to parse session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait::async_trait]
impl SessionStore for JsonSessionStore {
    async fn load_session(&self, name: &str) -> Result<Session> {
        let file = self.read().await?;
        // An empty name asks for the file's own default
        let wanted = if name.is_empty() {
            file.default.as_deref().unwrap_or_default()
        } else {
            name
        };
        file.sessions
            .iter()
            .find(|s| s.name == wanted)
            .cloned()
            .ok_or_else(|| Error::Session(format!("session {wanted:?} not found")))
    }

    async fn regional_sessions(&self) -> Result<Vec<Session>> {
        let file = self.read().await?;
        tracing::debug!(
            path = %self.path.display(),
            count = file.sessions.len(),
            "Loaded session pool"
        );
        Ok(file.sessions)
    }
}
