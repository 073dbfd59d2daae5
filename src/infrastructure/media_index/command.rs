//! Command-hook media index adapter

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{MediaIndex, MediaIndexError};

/// Runs a user-configured program with the saved file as its last argument
/// (e.g. a gallery rescan hook).
pub struct CommandMediaIndex {
    program: String,
    args: Vec<String>,
}

impl CommandMediaIndex {
    /// Create from a command line such as `"gio set -t string"`.
    /// Returns `None` for a blank command.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl MediaIndex for CommandMediaIndex {
    async fn notify(&self, path: &Path) -> Result<(), MediaIndexError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaIndexError::CommandNotFound(self.program.clone())
                } else {
                    MediaIndexError::RegisterFailed(e.to_string())
                }
            })?;

        if !status.success() {
            return Err(MediaIndexError::RegisterFailed(format!(
                "{} exited with status: {}",
                self.program, status
            )));
        }

        Ok(())
    }
}
