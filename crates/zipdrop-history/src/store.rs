//! Key-value persistence backends.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Key-value slot persistence.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key contains characters that cannot name a slot.
    #[error("invalid store key: {0}")]
    InvalidKey(String),
    /// Filesystem failure.
    #[error("store io failure: {0}")]
    Io(#[from] io::Error),
    /// In-memory lock was poisoned.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Shared in-memory store. Clones see the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one pre-filled slot.
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Reads a slot directly.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().map_err(|_| StoreError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per slot inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place. A failed
/// write removes the temporary file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidKey`] for empty keys or keys outside
    /// `[A-Za-z0-9_-]`.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|error| StoreError::Io(error.error))?;
        Ok(())
    }
}
