//! Run configuration model for `analyzerConfig.json`.
//!
//! The file is JSON with comments. Comment stripping, default handling and
//! merging live in `ba-core`; this module only describes the resolved shape.

use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "analyzerConfig.json";

/// The fully resolved configuration of one analyzer run.
///
/// Every field is required: a value is always present after defaults and the
/// override file have been merged. The struct is never mutated once built;
/// stages receive it behind an `Arc`.
///
/// # Example
///
/// ```json
/// {
///   "appStart": "npm start",
///   "uiPort": 4242,
///   "openUI": true
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Shell command that starts the web application under analysis.
    pub app_start: String,

    /// Run the DevTools driver without a visible window.
    pub dev_tools_headless: bool,

    /// Run the browser driver without a visible window.
    pub browser_headless: bool,

    /// Verbose logging inside the DevTools driver.
    pub dev_tools_debug: bool,

    /// Let the operator interact with the driven browser before extraction.
    pub allow_user_interaction: bool,

    /// Key that triggers a manual render tree extraction.
    pub extract_key: String,

    /// Ask the data generator to drop uninteresting suggestions.
    pub filter_suggestions: bool,

    /// File name of the render tree artifact, relative to the working directory.
    pub render_tree_file: String,

    /// Milliseconds between connection attempts to DevTools or the app.
    pub refresh_connection: u64,

    /// Milliseconds between signal file / render tree existence checks.
    pub check_file: u64,

    /// Milliseconds to wait for the extraction handshake before giving up.
    pub handshake_timeout: u64,

    /// Milliseconds after DevTools initialises before the tree is extracted.
    pub render_tree_wait: u64,

    /// Milliseconds DevTools gets to apply its component filters.
    pub update_filters: u64,

    /// Route of the web application that is analyzed.
    pub analyze_route: String,

    /// Milliseconds to settle after extraction before generating data.
    pub data_gen_wait: u64,

    /// Port the suggestions UI listens on.
    pub ui_port: u16,

    /// Open the suggestions UI in the default browser when the run is done.
    #[serde(rename = "openUI")]
    pub open_ui: bool,
}

impl AnalyzerConfig {
    pub fn check_file_interval(&self) -> Duration {
        Duration::from_millis(self.check_file)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout)
    }

    pub fn data_gen_wait(&self) -> Duration {
        Duration::from_millis(self.data_gen_wait)
    }

    /// Local URL at which the suggestions UI can be browsed.
    pub fn ui_url(&self) -> String {
        format!("http://localhost:{}/browse", self.ui_port)
    }
}
