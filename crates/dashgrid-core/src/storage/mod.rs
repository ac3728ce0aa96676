//! Storage abstraction for layout persistence.

mod memory;
mod persistence;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;
pub use persistence::{LAYOUT_KEY, LayoutPersistence};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value backend holding serialized layout blobs.
///
/// Calls are synchronous and expected to be cheap; the engine treats every
/// write as best-effort.
pub trait Storage {
    /// Store a blob under `key`, replacing any previous value.
    fn save(&self, key: &str, blob: &str) -> StorageResult<()>;

    /// Read the blob stored under `key`.
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Remove `key`. Missing keys are not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if `key` holds a blob.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
