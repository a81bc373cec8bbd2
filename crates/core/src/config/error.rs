//! Error types for configuration loading.
//!
//! This module defines all errors that can occur while reading, validating
//! or writing `~/.mini/config.toml`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a configuration file to disk.
    #[error("Failed to write config file at {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The home directory could not be determined.
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    /// Invalid configuration values.
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
