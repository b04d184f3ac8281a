//! Embedded default configuration.
//!
//! The canonical `analyzerConfig.json`, comments included, is embedded from
//! the workspace `templates/` directory at compile time so that first runs can
//! write it verbatim without shipping extra files.

use crate::config::error::{ConfigError, ConfigResult};
use ba_protocol::config_models::CONFIG_FILE_NAME;
use rust_embed::RustEmbed;

/// Embedded template files from the workspace `templates/` directory.
///
/// - `CARGO_MANIFEST_DIR` = `crates/core`
/// - `../../templates` = workspace root `templates/`
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path, or `None` if it is not embedded.
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// The canonical default configuration text, comments included.
pub fn default_config_text() -> ConfigResult<String> {
    get_template(CONFIG_FILE_NAME)
        .ok_or_else(|| ConfigError::TemplateMissing(CONFIG_FILE_NAME.to_string()))
}
