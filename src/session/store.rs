//! Persistent key-value storage for session state.
//!
//! The store is shared and has no transactional isolation: the last writer wins.
//! `set_many` writes a group of keys in one operation so a login never leaves a
//! half-written credential behind.

use crate::session::SessionError;
use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, RwLock},
};
use tracing::debug;

pub trait SessionStore: Send + Sync {
    /// Reads a value.
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Writes all entries in one operation.
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SessionError>;

    /// Removes all keys in one operation. Missing keys are ignored.
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError>;

    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.set_many(&[(key, value)])
    }

    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.remove_many(&[key])
    }
}

/// In-memory store, used by tests and short-lived embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SessionError::Store("Poisoned lock".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set_many(&self, new_entries: &[(&str, &str)]) -> Result<(), SessionError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SessionError::Store("Poisoned lock".to_string()))?;
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SessionError::Store("Poisoned lock".to_string()))?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// JSON file store. The whole map is rewritten through a temp file and a rename,
/// and the file is created with owner-only permissions on unix.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| {
                SessionError::Store(format!(
                    "invalid session file {}: {err}",
                    self.path.display()
                ))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(SessionError::Store(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                SessionError::Store(format!("failed to create {}: {err}", parent.display()))
            })?;
        }

        let payload = serde_json::to_string_pretty(map)
            .map_err(|err| SessionError::Store(format!("failed to encode session: {err}")))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload).map_err(|err| {
            SessionError::Store(format!("failed to write {}: {err}", tmp_path.display()))
        })?;
        restrict_permissions(&tmp_path)?;
        fs::rename(&tmp_path, &self.path).map_err(|err| {
            SessionError::Store(format!("failed to replace {}: {err}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), keys = map.len(), "session file written");
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionError::Store("Poisoned lock".to_string()))?;
        Ok(self.read_map()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SessionError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionError::Store("Poisoned lock".to_string()))?;
        let mut map = self.read_map()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_map(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionError::Store("Poisoned lock".to_string()))?;
        let mut map = self.read_map()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        // Nothing to clear: skip creating a file that never existed.
        if map.len() == before {
            return Ok(());
        }
        self.write_map(&map)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), SessionError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|err| {
        SessionError::Store(format!(
            "failed to set permissions on {}: {err}",
            path.display()
        ))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), SessionError> {
    Ok(())
}
