//! Error types for filesystem gates.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

#[derive(Debug, Error)]
pub enum GateError {
    /// The signal file did not appear within the configured bound.
    #[error("Handshake timed out after {}ms waiting for {}", .waited.as_millis(), .path.display())]
    HandshakeTimeout { path: PathBuf, waited: Duration },

    /// A gate file could not be inspected or removed.
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
