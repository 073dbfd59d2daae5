//! Media registration port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Media registration errors
#[derive(Debug, Clone, Error)]
pub enum MediaIndexError {
    #[error("Media index command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to register media: {0}")]
    RegisterFailed(String),
}

/// Port for making saved files visible to the media catalog
#[async_trait]
pub trait MediaIndex: Send + Sync {
    /// Register a finished file.
    ///
    /// # Arguments
    /// * `path` - The saved photo or video
    async fn notify(&self, path: &Path) -> Result<(), MediaIndexError>;
}

/// Blanket implementation for boxed media index types
#[async_trait]
impl MediaIndex for Box<dyn MediaIndex> {
    async fn notify(&self, path: &Path) -> Result<(), MediaIndexError> {
        self.as_ref().notify(path).await
    }
}
