//! Credential storage backends.

use super::error::{CredentialError, CredentialResult};
use super::Credentials;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the persisted credential map.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Persistent storage for provider credentials.
pub trait CredentialStore: Send + Sync {
    /// Read the persisted credentials. A store that has never been written
    /// yields an empty map.
    fn load(&self) -> CredentialResult<Credentials>;

    /// Replace the persisted credentials with `credentials`.
    fn save(&self, credentials: &Credentials) -> CredentialResult<()>;
}

/// Credentials persisted as a JSON object keyed by provider.
///
/// ```json
/// { "gemini": "AIza...", "openai": "sk-..." }
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform configuration directory,
    /// e.g. `~/.config/agent-relay/credentials.json`.
    pub fn in_config_dir() -> CredentialResult<Self> {
        let dir = dirs::config_dir().ok_or(CredentialError::NoConfigDir)?;
        Ok(Self::new(dir.join("agent-relay").join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> CredentialResult<Credentials> {
        if !self.path.exists() {
            return Ok(Credentials::default());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|source| CredentialError::FileRead {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, credentials: &Credentials) -> CredentialResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CredentialError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(credentials).map_err(|source| {
            CredentialError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        std::fs::write(&self.path, content).map_err(|source| CredentialError::FileWrite {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory store with no persistence, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Credentials>,
    saves: Mutex<usize>,
}

impl MemoryCredentialStore {
    pub fn new(initial: Credentials) -> Self {
        Self {
            inner: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> CredentialResult<Credentials> {
        Ok(self
            .inner
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default())
    }

    fn save(&self, credentials: &Credentials) -> CredentialResult<()> {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = credentials.clone();
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar_protocol::Provider;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/credentials.json"));

        let mut credentials = Credentials::default();
        credentials.set(Provider::Gemini, "g-key");
        credentials.set(Provider::OpenAi, "o-key");
        store.save(&credentials).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"gemini\""));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.get(Provider::Gemini), Some("g-key"));
        assert_eq!(loaded.get(Provider::OpenAi), Some("o-key"));
        assert_eq!(loaded.get(Provider::Grok), None);
    }

    #[test]
    fn test_file_store_skips_unrecognised_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"openai":"sk-1","mistral":"m-1"}"#).unwrap();

        let loaded = FileCredentialStore::new(&path).load().unwrap();
        assert_eq!(loaded.get(Provider::OpenAi), Some("sk-1"));
        assert_eq!(loaded.providers().collect::<Vec<_>>(), vec![Provider::OpenAi]);
    }

    #[test]
    fn test_file_store_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileCredentialStore::new(&path).load();
        assert!(matches!(result, Err(CredentialError::Parse { .. })));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryCredentialStore::default();
        store.save(&Credentials::default()).unwrap();
        store.save(&Credentials::default()).unwrap();
        assert_eq!(store.save_count(), 2);
    }
}
