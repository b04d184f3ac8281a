//! Helpers for inspecting the event stream of a run.

use ba_protocol::ipc::Event;
use ba_protocol::pipeline_models::{PipelineStage, RunState};

/// The sequence of states the run went through.
pub fn states(events: &[Event]) -> Vec<RunState> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::StateChanged { state } => Some(*state),
            _ => None,
        })
        .collect()
}

/// Labels of every spawned child, in spawn order.
pub fn spawned_labels(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ProcessSpawned { label, .. } => Some(label.clone()),
            _ => None,
        })
        .collect()
}

/// The states of a run that reached `Done`.
pub fn happy_path() -> Vec<RunState> {
    let mut expected = vec![RunState::ConfigLoading];
    expected.extend(PipelineStage::ALL.into_iter().map(RunState::Running));
    expected.push(RunState::Done);
    expected
}

/// The states of a run that failed in `stage`.
pub fn failed_path(stage: PipelineStage) -> Vec<RunState> {
    let mut expected = vec![RunState::ConfigLoading];
    expected.extend(
        PipelineStage::ALL
            .into_iter()
            .take_while(|s| *s != stage)
            .map(RunState::Running),
    );
    expected.push(RunState::Running(stage));
    expected.push(RunState::Failed(
        ba_protocol::pipeline_models::FailedAt::Stage(stage),
    ));
    expected
}

/// Whether the working directory still contains a signal file.
pub fn has_signal_file(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .any(|entry| entry.file_name().to_string_lossy().starts_with(".analyzer-signal-"))
        })
        .unwrap_or(false)
}
