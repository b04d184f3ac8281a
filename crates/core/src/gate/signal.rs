//! Signal file rendezvous between the extraction drivers.
//!
//! One driver posts an empty marker file once it reaches its readiness point;
//! the other polls for it. The orchestrator hands both the same file name and
//! polls too, so a handshake that never happens fails the stage instead of
//! hanging the run.

use crate::gate::artifact::remove_if_exists;
use crate::gate::error::{GateError, GateResult};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const SIGNAL_FILE_PREFIX: &str = ".analyzer-signal-";

/// Marker file whose existence is the synchronization signal.
///
/// The name is derived from the run start time in milliseconds. Two runs
/// started in the same directory within the same millisecond would share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalFile {
    name: String,
    path: PathBuf,
}

impl SignalFile {
    /// The signal file for a run started at `started_at`, located in `dir`.
    pub fn for_run(dir: &Path, started_at: DateTime<Utc>) -> Self {
        let name = format!("{SIGNAL_FILE_PREFIX}{}", started_at.timestamp_millis());
        Self {
            path: dir.join(&name),
            name,
        }
    }

    /// File name passed to the drivers through `SIGNAL_FILE`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn is_posted(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Create the marker. An already posted marker is left untouched.
    pub async fn post(&self) -> GateResult<()> {
        let result = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(source) => Err(GateError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Remove the marker if present. Returns `true` when a file was removed.
    pub async fn clear(&self) -> GateResult<bool> {
        remove_if_exists(&self.path).await
    }

    /// Poll every `interval` until the marker exists.
    ///
    /// # Errors
    ///
    /// Returns `GateError::HandshakeTimeout` if it has not appeared after `timeout`.
    pub async fn wait_posted(&self, interval: Duration, timeout: Duration) -> GateResult<()> {
        let poll = async {
            loop {
                if self.is_posted().await {
                    return;
                }
                tokio::time::sleep(interval).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| GateError::HandshakeTimeout {
                path: self.path.clone(),
                waited: timeout,
            })?;

        debug!(path = %self.path.display(), "signal file posted");
        Ok(())
    }
}
