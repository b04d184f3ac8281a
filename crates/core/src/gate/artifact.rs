//! Stale render tree guard.

use crate::gate::error::{GateError, GateResult};
use std::path::Path;
use tracing::info;

/// Delete the render tree left by a previous run, if any.
///
/// Returns `true` when a file was removed. Must run before the app starts so a
/// failed extraction can never be followed by a transform of old data.
pub async fn remove_stale_artifact(path: &Path) -> GateResult<bool> {
    let removed = remove_if_exists(path).await?;
    if removed {
        info!(path = %path.display(), "removed stale render tree");
    }
    Ok(removed)
}

pub(crate) async fn remove_if_exists(path: &Path) -> GateResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(GateError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
