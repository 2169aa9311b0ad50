//! Persistent client state.
//!
//! [`KeyValueStore`] is the stand-in for browser local storage: a flat map
//! of opaque string values. Two implementations are provided:
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`MemoryStore`] | In-process map, lost on exit |
//! | [`FileStore`] | JSON object file, rewritten on every mutation |

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Keys
// ============================================================================

/// Bearer credential attached to outgoing requests.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// UI colour scheme.
pub const THEME_KEY: &str = "theme";

/// Whether the navigation sidebar is collapsed.
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebar-collapsed";

/// Whether the first-run welcome screen has been dismissed.
pub const HAS_SEEN_WELCOME_KEY: &str = "hasSeenWelcome";

// ============================================================================
// KeyValueStore
// ============================================================================

/// String key/value persistence shared by the HTTP and realtime clients.
///
/// Reads are infallible: a missing or unreadable key is `None`.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// File-backed store holding a single JSON object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<FxHashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, loading it if the file exists.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file exists but cannot be read
    /// - [`Error::Storage`] if the file is not a JSON object of strings
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                FxHashMap::default()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    Error::storage(format!("{} is not a string map: {e}", path.display()))
                })?
            }
        } else {
            FxHashMap::default()
        };

        debug!(path = %path.display(), entries = values.len(), "Opened file store");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Opens the store at the per-user default location.
    ///
    /// `<config_dir>/openslam/client-state.json`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the platform has no config directory.
    pub fn open_default() -> Result<Self> {
        let path = Self::default_path()
            .ok_or_else(|| Error::storage("No config directory on this platform"))?;
        Self::open(path)
    }

    /// Returns the per-user default location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("openslam").join("client-state.json"))
    }

    /// Returns the backing file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &FxHashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(AUTH_TOKEN_KEY), None);

        store.set(AUTH_TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).as_deref(), Some("abc"));

        store.remove(AUTH_TOKEN_KEY).unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY), None);
    }

    #[test]
    fn test_memory_store_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nope").is_ok());
    }

    #[test]
    fn test_memory_store_with_entries() {
        let store = MemoryStore::with_entries([(THEME_KEY, "dark")]);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set(AUTH_TOKEN_KEY, "token-1").unwrap();
            store.set(SIDEBAR_COLLAPSED_KEY, "true").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(AUTH_TOKEN_KEY).as_deref(), Some("token-1"));
        assert_eq!(reopened.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("true"));

        reopened.remove(AUTH_TOKEN_KEY).unwrap();
        let again = FileStore::open(&path).unwrap();
        assert_eq!(again.get(AUTH_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }

    #[test]
    fn test_file_store_empty_file_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(THEME_KEY), None);
    }
}
