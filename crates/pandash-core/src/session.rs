//! Persisted dashboard session: the API key and the selected account.
//!
//! The session file lives in the per-user data directory and survives
//! restarts. When the backend turns `ui.api_key_retention` off, the key is
//! held in memory only and scrubbed from the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;

/// On-disk session format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// API key sent as `X-API-Key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Account the account-scoped tabs operate on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_account: Option<String>,
    /// Whether `api_key` may be written to this file.
    #[serde(default = "retain_by_default")]
    pub retain_api_key: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            api_key: None,
            selected_account: None,
            retain_api_key: true,
        }
    }
}

const fn retain_by_default() -> bool {
    true
}

/// Session state plus where to persist it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
    state: SessionState,
}

impl SessionStore {
    /// Default location of the session file.
    pub fn default_path() -> PathBuf {
        Config::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("session.json")
    }

    /// Load the session from `path`, returning an empty session if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            SessionState::default()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            state,
        })
    }

    /// Load the session from `path`, falling back to an empty one on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable session file {}: {e}", path.display());
            Self {
                path: Some(path.to_path_buf()),
                state: SessionState::default(),
            }
        })
    }

    /// A session that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: SessionState::default(),
        }
    }

    /// Current state.
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// The stored API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.state.api_key.as_deref()
    }

    /// The selected account, if any.
    pub fn selected_account(&self) -> Option<&str> {
        self.state.selected_account.as_deref()
    }

    /// Whether the API key is written to disk.
    pub const fn retains_api_key(&self) -> bool {
        self.state.retain_api_key
    }

    /// Store a new API key.
    pub fn set_api_key(&mut self, key: impl Into<String>) -> Result<()> {
        self.state.api_key = Some(key.into());
        self.save()
    }

    /// Forget the API key.
    pub fn clear_api_key(&mut self) -> Result<()> {
        self.state.api_key = None;
        self.save()
    }

    /// Store the selected account.
    pub fn set_selected_account(&mut self, account: Option<String>) -> Result<()> {
        self.state.selected_account = account;
        self.save()
    }

    /// Toggle on-disk retention of the API key. The choice itself is
    /// persisted so it holds across restarts.
    pub fn set_retain_api_key(&mut self, retain: bool) -> Result<()> {
        if self.state.retain_api_key == retain {
            return Ok(());
        }
        self.state.retain_api_key = retain;
        self.save()
    }

    /// Write the session file.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut on_disk = self.state.clone();
        if !self.state.retain_api_key {
            on_disk.api_key = None;
        }

        let content = serde_json::to_string_pretty(&on_disk)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_persists_key_and_account() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::load(&path).unwrap();
        assert!(store.api_key().is_none());
        store.set_api_key("secret").unwrap();
        store.set_selected_account(Some("alice".into())).unwrap();

        let reloaded = SessionStore::load(&path).unwrap();
        assert_eq!(reloaded.api_key(), Some("secret"));
        assert_eq!(reloaded.selected_account(), Some("alice"));
    }

    #[test]
    fn test_clear_api_key_keeps_account() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::load(&path).unwrap();
        store.set_api_key("secret").unwrap();
        store.set_selected_account(Some("bob".into())).unwrap();
        store.clear_api_key().unwrap();

        let reloaded = SessionStore::load(&path).unwrap();
        assert!(reloaded.api_key().is_none());
        assert_eq!(reloaded.selected_account(), Some("bob"));
    }

    #[test]
    fn test_no_retention_keeps_key_in_memory_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::load(&path).unwrap();
        store.set_api_key("secret").unwrap();
        store.set_retain_api_key(false).unwrap();

        assert_eq!(store.api_key(), Some("secret"));
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("secret"));
    }

    #[test]
    fn test_no_retention_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut first = SessionStore::load(&path).unwrap();
        first.set_retain_api_key(false).unwrap();
        first.set_api_key("secret").unwrap();
        drop(first);

        let mut second = SessionStore::load(&path).unwrap();
        assert!(!second.retains_api_key());
        assert!(second.api_key().is_none());

        second.set_api_key("secret").unwrap();
        second.set_selected_account(Some("alice".into())).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("secret"));
        assert!(on_disk.contains("alice"));
    }

    #[test]
    fn test_old_session_file_retains_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"api_key":"k"}"#).unwrap();

        let store = SessionStore::load(&path).unwrap();
        assert!(store.retains_api_key());
        assert_eq!(store.api_key(), Some("k"));
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(SessionStore::load(&path).is_err());
        let store = SessionStore::load_or_default(&path);
        assert_eq!(store.state(), &SessionState::default());
    }

    #[test]
    fn test_in_memory_never_writes() {
        let mut store = SessionStore::in_memory();
        store.set_api_key("k").unwrap();
        assert_eq!(store.api_key(), Some("k"));
    }
}
