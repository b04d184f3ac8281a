//! Error types for configuration loading.
//!
//! This module defines all errors that can occur while reading, parsing,
//! merging and writing `analyzerConfig.json`.

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

    /// The file is not valid JSON once comments are stripped.
    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file parsed but its top level is not a JSON object.
    #[error("Config file at {path} must contain a JSON object")]
    NotAnObject { path: PathBuf },

    /// A recognised key carries a value of the wrong type.
    #[error("Invalid configuration value: {source}")]
    InvalidValue { source: serde_json::Error },

    /// Failed to write the default configuration file.
    #[error("Failed to write config file at {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The embedded default configuration is missing from the binary.
    #[error("Embedded default config template not found: {0}")]
    TemplateMissing(String),
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
