//! Events emitted by the orchestrator while a run progresses.
//!
//! The orchestrator pushes `Event`s into a `tokio::sync::mpsc` channel; the
//! command-line front end drains it and renders progress. Events use tagged
//! serialization so they can also be dumped as JSON lines:
//!
//! ```json
//! {
//!   "type": "processExited",
//!   "payload": { "label": "devtools", "stage": "EXTRACTION_RUNNING", "exit": { "code": 2, "signal": null } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::pipeline_models::{FailedAt, PipelineStage, RunState};
use crate::process_models::ProcessExit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The run moved to a new state.
    StateChanged { state: RunState },

    /// An override configuration file was found and merged.
    ConfigLoaded { path: PathBuf },

    /// No configuration file existed; the default one was written.
    ///
    /// No stage runs after this event.
    ConfigCreated { path: PathBuf },

    /// A render tree left over from a previous run was deleted.
    StaleArtifactRemoved { path: PathBuf },

    /// A collaborator process was spawned.
    ProcessSpawned {
        id: Uuid,
        label: String,
        stage: PipelineStage,
        pid: Option<u32>,
    },

    /// A collaborator process exited.
    ProcessExited {
        id: Uuid,
        label: String,
        stage: PipelineStage,
        exit: ProcessExit,
    },

    /// The extraction handshake signal file appeared.
    SignalPosted { path: PathBuf },

    /// The run failed; no later stage will start.
    RunFailed { at: FailedAt, error: String },

    /// The suggestions UI is reachable at `url`.
    UiReady { url: String, opened: bool },
}
