//! Load and save of the dashboard layout through a [`Storage`] backend.

use crate::layout::LayoutSnapshot;
use crate::storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;

/// Key under which the layout blob is stored.
pub const LAYOUT_KEY: &str = "dashboard-layout";

/// Serializes layouts to and from a storage backend.
///
/// Writes are best-effort: a failed save leaves the persistence dirty and the
/// in-memory layout stays authoritative until the next successful save.
pub struct LayoutPersistence<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Key the layout lives under.
    key: String,
    /// Whether the last save failed.
    dirty: bool,
    /// Number of successful saves.
    saves: u64,
}

impl<S: Storage> LayoutPersistence<S> {
    /// Create a persistence layer using [`LAYOUT_KEY`].
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_key(storage, LAYOUT_KEY)
    }

    /// Create a persistence layer storing under a custom key.
    pub fn with_key(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            dirty: false,
            saves: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the in-memory layout is ahead of storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of successful saves since creation.
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    /// Load the stored layout.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet. Blobs that fail to
    /// parse come back as [`StorageError::Serialization`].
    pub fn load(&self) -> StorageResult<Option<LayoutSnapshot>> {
        let blob = match self.storage.load(&self.key) {
            Ok(blob) => blob,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        LayoutSnapshot::from_json(&blob)
            .map(Some)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", self.key, e)))
    }

    /// Save the layout.
    pub fn save(&mut self, snapshot: &LayoutSnapshot) -> StorageResult<()> {
        let result = snapshot
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| self.storage.save(&self.key, &json));
        match result {
            Ok(()) => {
                self.dirty = false;
                self.saves += 1;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                Err(e)
            }
        }
    }

    /// Remove the stored layout.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.delete(&self.key)
    }
}
