//! Error types for pipeline runs.

use crate::config::ConfigError;
use crate::gate::GateError;
use crate::process::ProcessError;
use ba_protocol::pipeline_models::{FailedAt, PipelineStage};
use ba_protocol::process_models::ProcessExit;
use thiserror::Error;

/// Result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Why a run stopped before reaching `Done`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration file could not be read, parsed or merged.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required collaborator could not be started.
    #[error("{stage} stage could not start: {source}")]
    Spawn {
        stage: PipelineStage,
        source: ProcessError,
    },

    /// A required collaborator exited unsuccessfully.
    #[error("{stage} stage failed: {label} finished with {exit}")]
    StageExit {
        stage: PipelineStage,
        label: String,
        exit: ProcessExit,
    },

    /// A gate file could not be handled or the handshake timed out.
    #[error("{at} failed: {source}")]
    Gate { at: FailedAt, source: GateError },
}
