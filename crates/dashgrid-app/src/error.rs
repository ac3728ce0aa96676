//! Application error type.

use dashgrid_core::{LayoutError, StorageError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
