//! Media registration adapters
//!
//! A configured command hook when available, otherwise log-only.

mod command;
mod log;

pub use command::CommandMediaIndex;
pub use log::LogMediaIndex;

use crate::application::ports::MediaIndex;

/// Create the media index for an optional command line
pub fn create_media_index(command: Option<&str>) -> Box<dyn MediaIndex> {
    match command.and_then(CommandMediaIndex::from_command_line) {
        Some(index) => Box::new(index),
        None => Box::new(LogMediaIndex::new()),
    }
}
