//! Configuration file loader for `analyzerConfig.json`.
//!
//! Resolution works in three steps:
//! 1. The embedded default file is parsed into the full key set.
//! 2. The override file in the working directory, if any, is parsed into a
//!    partial map.
//! 3. Override keys replace defaults one by one; keys the defaults do not know
//!    are dropped.
//!
//! When the override file is missing the default file is written verbatim and
//! the caller is told not to run the pipeline.

use crate::config::comments::strip_comments;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::ConfigOutcome;
use crate::config::templates::default_config_text;
use ba_protocol::config_models::AnalyzerConfig;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Parses the embedded default configuration.
///
/// # Errors
///
/// Fails only if the embedded template is missing or malformed, which is a
/// packaging bug.
pub fn load_defaults() -> ConfigResult<AnalyzerConfig> {
    let path = PathBuf::from("<embedded default>");
    let map = parse_config_text(&default_config_text()?, &path)?;
    serde_json::from_value(Value::Object(map)).map_err(|source| ConfigError::InvalidValue { source })
}

/// Reads and parses an override file into a partial key map.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, is not valid
/// JSON after comment stripping, or is not a JSON object.
pub fn load_override(path: &Path) -> ConfigResult<Option<Map<String, Value>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_config_text(&content, path).map(Some)
}

/// Merges `overrides` over `defaults`.
///
/// Every key of `defaults` is present in the result. A key takes the override
/// value exactly when `overrides` supplies it; keys unknown to the defaults
/// never reach the result.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when a known key carries a value of the
/// wrong type (for example a string for `uiPort`).
pub fn merge(
    defaults: &AnalyzerConfig,
    overrides: Map<String, Value>,
) -> ConfigResult<AnalyzerConfig> {
    let mut merged = match serde_json::to_value(defaults) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(source) => return Err(ConfigError::InvalidValue { source }),
    };

    for (key, value) in overrides {
        if let Some(slot) = merged.get_mut(&key) {
            *slot = value;
        } else {
            debug!(key = %key, "ignoring unknown config key");
        }
    }

    serde_json::from_value(Value::Object(merged)).map_err(|source| ConfigError::InvalidValue { source })
}

/// Writes the canonical default configuration, comments included, to `path`.
pub fn persist_defaults(path: &Path) -> ConfigResult<()> {
    let content = default_config_text()?;
    std::fs::write(path, content).map_err(|source| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the run configuration from the file at `path`.
///
/// # Returns
///
/// - `ConfigOutcome::Loaded` with the merged configuration when the file exists.
/// - `ConfigOutcome::CreatedDefault` after writing the default file when it
///   does not. The pipeline must not run in that case.
///
/// # Example
///
/// ```rust,no_run
/// use ba_core::config::{resolve, ConfigOutcome};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// match resolve(Path::new("analyzerConfig.json"))? {
///     ConfigOutcome::Loaded { config, .. } => println!("UI on port {}", config.ui_port),
///     ConfigOutcome::CreatedDefault { path } => println!("edit {} and rerun", path.display()),
/// }
/// # Ok(())
/// # }
/// ```
pub fn resolve(path: &Path) -> ConfigResult<ConfigOutcome> {
    let defaults = load_defaults()?;

    match load_override(path)? {
        Some(overrides) => {
            let config = merge(&defaults, overrides)?;
            info!(path = %path.display(), "parsed config file");
            Ok(ConfigOutcome::Loaded {
                config,
                path: path.to_path_buf(),
            })
        }
        None => {
            info!(path = %path.display(), "config file not found, writing defaults");
            persist_defaults(path)?;
            Ok(ConfigOutcome::CreatedDefault {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Strips comments and parses the remaining text as a JSON object.
fn parse_config_text(text: &str, path: &Path) -> ConfigResult<Map<String, Value>> {
    let value: Value =
        serde_json::from_str(&strip_comments(text)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}
