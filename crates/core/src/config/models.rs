//! Result of resolving the run configuration.

use ba_protocol::config_models::AnalyzerConfig;
use std::path::PathBuf;

/// What [`resolve`](crate::config::loader::resolve) found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// An override file existed and was merged over the defaults.
    Loaded {
        config: AnalyzerConfig,
        path: PathBuf,
    },

    /// No file existed; the commented default file was written to `path`.
    ///
    /// This is the first-run signal: the pipeline must not start.
    CreatedDefault { path: PathBuf },
}
