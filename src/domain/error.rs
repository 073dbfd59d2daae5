//! Domain error types

use thiserror::Error;

/// Error when parsing an interval string
#[derive(Debug, Clone, Error)]
#[error("Invalid interval format: \"{input}\". Expected format: <number>s, <number>m, <number>h or a combination (e.g., 5s, 2m, 1m30s)")]
pub struct IntervalParseError {
    pub input: String,
}

/// Error when a value is not one of a fixed set of choices (lens, flash mode, ...)
#[derive(Debug, Clone, Error)]
#[error("Invalid {kind}: \"{input}\". Valid values are: {valid}")]
pub struct InvalidChoiceError {
    pub kind: &'static str,
    pub input: String,
    pub valid: &'static str,
}

/// Error when coordinates are outside the WGS84 range
#[derive(Debug, Clone, Error)]
#[error("Invalid coordinates: latitude {latitude} must be within [-90, 90] and longitude {longitude} within [-180, 180]")]
pub struct InvalidCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
