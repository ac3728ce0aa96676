//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-seeded with one blob.
    pub fn with_blob(key: &str, blob: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut blobs) = storage.blobs.write() {
            blobs.insert(key.to_string(), blob.to_string());
        }
        storage
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, blob: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<String> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        blobs.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(blobs.contains_key(key))
    }
}
