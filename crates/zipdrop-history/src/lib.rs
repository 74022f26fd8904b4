#![warn(missing_docs)]
//! # zipdrop-history
//!
//! ## Purpose
//! Keeps the bounded, most-recent-first list of completed uploads and
//! persists it through a swappable key-value slot.
//!
//! ## Responsibilities
//! - Abstract persistence as [`KeyValueStore`] with in-memory and file-backed
//!   implementations.
//! - Load history once, tolerating missing or malformed persisted values.
//! - Rewrite the full list on every mutation and cap it at [`MAX_HISTORY`].
//! - Report which cloud object to delete when a removal requests it.
//!
//! ## Data flow
//! Session success -> [`HistoryStore::prepend`] -> JSON list written under
//! [`HISTORY_KEY`]. User removal -> [`HistoryStore::remove`] -> optional storage
//! key returned to the caller, which spawns a detached remote delete.
//!
//! ## Error model
//! Persistence failures return [`HistoryError`] after the in-memory list has
//! already changed, so the UI stays consistent with what the user did.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

use thiserror::Error;
use tracing::{debug, warn};
use zipdrop_core::UploadRecord;

/// Persisted slot name for history.
pub const HISTORY_KEY: &str = "zipdrop-history";

/// Maximum number of records kept.
pub const MAX_HISTORY: usize = 10;

/// Whether removing a record should also delete its cloud object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDeletion {
    /// Only forget the record locally.
    Keep,
    /// Also delete the stored object, best effort.
    Request,
}

/// Record removed from history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The removed record.
    pub record: UploadRecord,
    /// Storage key to delete remotely, when requested and cloud-backed.
    pub delete_storage_key: Option<String>,
}

/// History persistence failure.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Backing store failure.
    #[error("history store failure: {0}")]
    Store(#[from] StoreError),
    /// JSON encoding failure.
    #[error("history codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Bounded upload history backed by a key-value slot.
#[derive(Debug)]
pub struct HistoryStore<S: KeyValueStore> {
    store: S,
    records: Vec<UploadRecord>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Loads history from `store`.
    ///
    /// A missing slot, an unreadable slot, or a malformed value all yield an
    /// empty history. Oversized persisted lists are cut to [`MAX_HISTORY`].
    pub fn load(store: S) -> Self {
        let records = match store.load(HISTORY_KEY) {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, "history slot unreadable; starting empty");
                Vec::new()
            }
        };
        debug!(records = records.len(), "history loaded");
        Self { store, records }
    }

    /// Records, most recent first.
    pub fn all(&self) -> &[UploadRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when history is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up one record.
    pub fn get(&self, id: &str) -> Option<&UploadRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds a record at the front, dropping the oldest beyond the cap.
    ///
    /// # Errors
    /// Returns [`HistoryError`] when the slot cannot be rewritten.
    pub fn prepend(&mut self, record: UploadRecord) -> Result<(), HistoryError> {
        self.records.insert(0, record);
        if self.records.len() > MAX_HISTORY {
            let dropped = self.records.len() - MAX_HISTORY;
            self.records.truncate(MAX_HISTORY);
            debug!(dropped, "history truncated");
        }
        self.persist()
    }

    /// Removes a record by id.
    ///
    /// Returns `Ok(None)` when no record matches. The storage key is reported
    /// only for cloud-backed records with [`RemoteDeletion::Request`].
    ///
    /// # Errors
    /// Returns [`HistoryError`] when the slot cannot be rewritten.
    pub fn remove(
        &mut self,
        id: &str,
        deletion: RemoteDeletion,
    ) -> Result<Option<Removal>, HistoryError> {
        let Some(index) = self.records.iter().position(|record| record.id == id) else {
            return Ok(None);
        };

        let record = self.records.remove(index);
        self.persist()?;

        let delete_storage_key = match deletion {
            RemoteDeletion::Request => record.cloud_storage_key().map(str::to_string),
            RemoteDeletion::Keep => None,
        };
        Ok(Some(Removal {
            record,
            delete_storage_key,
        }))
    }

    /// Removes every record.
    ///
    /// # Errors
    /// Returns [`HistoryError`] when the slot cannot be rewritten.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.records.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(&self.records)?;
        self.store.save(HISTORY_KEY, &raw)?;
        Ok(())
    }
}

fn decode(raw: &str) -> Vec<UploadRecord> {
    match serde_json::from_str::<Vec<UploadRecord>>(raw) {
        Ok(mut records) => {
            records.truncate(MAX_HISTORY);
            records
        }
        Err(error) => {
            warn!(%error, "persisted history malformed; starting empty");
            Vec::new()
        }
    }
}
