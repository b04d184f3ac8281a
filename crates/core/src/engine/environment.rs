//! Environment overlays handed to collaborators.
//!
//! Values are rendered the way the JavaScript collaborators read them:
//! booleans as `true`/`false`, durations as plain millisecond counts.

use crate::gate::SignalFile;
use ba_protocol::config_models::AnalyzerConfig;
use std::path::Path;

/// Overlay for the target web application.
///
/// `BROWSER=none` stops create-react-app style dev servers from opening a tab.
pub fn app_env() -> Vec<(String, String)> {
    vec![("BROWSER".to_string(), "none".to_string())]
}

/// Overlay shared by both extraction drivers.
///
/// Both drivers receive every key, even the ones only one of them reads.
pub fn extraction_env(
    config: &AnalyzerConfig,
    workdir: &Path,
    signal: &SignalFile,
) -> Vec<(String, String)> {
    vec![
        ("RENDER_TREE_PATH".into(), workdir.to_string_lossy().into_owned()),
        ("RENDER_TREE_FILE".into(), config.render_tree_file.clone()),
        ("RENDER_TREE_WAIT".into(), config.render_tree_wait.to_string()),
        ("DEVTOOLS_HEADLESS".into(), config.dev_tools_headless.to_string()),
        ("DEVTOOLS_DEBUG".into(), config.dev_tools_debug.to_string()),
        ("UPDATE_FILTERS".into(), config.update_filters.to_string()),
        ("SIGNAL_FILE".into(), signal.name().to_string()),
        ("ANALYZE_ROUTE".into(), config.analyze_route.clone()),
        ("REFRESH_CONN".into(), config.refresh_connection.to_string()),
        ("BROWSER_HEADLESS".into(), config.browser_headless.to_string()),
        (
            "ALLOW_USER_INTERACTION".into(),
            config.allow_user_interaction.to_string(),
        ),
        ("EXTRACT_KEY".into(), config.extract_key.clone()),
        ("CHECK_FILE".into(), config.check_file.to_string()),
        ("HANDSHAKE_TIMEOUT".into(), config.handshake_timeout.to_string()),
    ]
}

/// Overlay for the data generator.
pub fn data_generation_env(config: &AnalyzerConfig) -> Vec<(String, String)> {
    vec![(
        "FILTER_SUGGESTIONS".to_string(),
        config.filter_suggestions.to_string(),
    )]
}
