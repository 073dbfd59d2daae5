//! Configuration storage port

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Persistent store for the user's `AppConfig`
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored configuration. A missing file yields an empty config, not an error.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored configuration, creating parent directories as needed
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the backing file
    fn path(&self) -> PathBuf;

    /// Write the defaults; fails with `AlreadyExists` if a file is present
    async fn init(&self) -> Result<(), ConfigError>;
}
