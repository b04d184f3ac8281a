//! Error types for process supervision.

use thiserror::Error;

/// Result type for process supervision operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors that can occur while starting a child process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable is missing, not executable, or the working directory is unusable.
    #[error("Failed to spawn {label} (`{command}`): {source}")]
    Spawn {
        label: String,
        command: String,
        source: std::io::Error,
    },
}
