//! Logging media index adapter

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{MediaIndex, MediaIndexError};

/// Media index that only records the registration in the log
///
/// Used when no registration command is configured.
pub struct LogMediaIndex;

impl LogMediaIndex {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogMediaIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaIndex for LogMediaIndex {
    async fn notify(&self, path: &Path) -> Result<(), MediaIndexError> {
        info!(path = %path.display(), "Media registered");
        Ok(())
    }
}
