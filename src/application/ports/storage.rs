//! Media storage port interface

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::domain::capture::MediaKind;

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Failed to create output directory {path}: {message}")]
    CreateDir { path: String, message: String },

    #[error("Failed to allocate output file: {0}")]
    Allocate(String),
}

/// Port for the fixed output directory
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Make sure the output directory exists.
    async fn prepare(&self) -> Result<(), StorageError>;

    /// Reserve a fresh, timestamp-named path for a capture taken at `at`.
    async fn allocate(&self, kind: MediaKind, at: DateTime<Local>) -> Result<PathBuf, StorageError>;
}
