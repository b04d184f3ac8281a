//! Terminal rendering of orchestrator events.
//!
//! Stage banners and the final URL go to stdout; everything else is left to
//! the tracing subscriber on stderr.

use ba_protocol::ipc::Event;
use ba_protocol::pipeline_models::{PipelineStage, RunState};
use colored::Colorize;
use tokio::sync::mpsc::Receiver;

/// Banner printed when a stage starts.
fn stage_banner(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::AppStarting => "Starting webapp...",
        PipelineStage::ExtractionRunning => "Starting DevTools and Browser...",
        PipelineStage::DataGenerating => "Preparing data.json...",
        PipelineStage::UiStarting => "Starting Suggestions UI...",
        PipelineStage::BrowserOpening => "Opening Suggestions UI...",
    }
}

/// The line to print for `event`, if any.
pub fn render_event(event: &Event) -> Option<String> {
    match event {
        Event::StateChanged {
            state: RunState::Running(stage),
        } => Some(stage_banner(*stage).cyan().bold().to_string()),
        Event::StateChanged {
            state: RunState::Done,
        } => Some("Done.".green().bold().to_string()),
        Event::ConfigCreated { path } => Some(format!(
            "{} {}\n{}",
            "Created".green().bold(),
            path.display(),
            "Edit it to match your webapp and run analyze again.".yellow()
        )),
        Event::StaleArtifactRemoved { path } => Some(
            format!("Removed previous render tree {}", path.display())
                .dimmed()
                .to_string(),
        ),
        Event::RunFailed { at, error } => Some(format!(
            "{} {}",
            format!("Failed during {at}:").red().bold(),
            error
        )),
        Event::UiReady { url, .. } => Some(format!(
            "View suggestions for your webapp here: {}",
            url.green().underline()
        )),
        Event::StateChanged { .. }
        | Event::ConfigLoaded { .. }
        | Event::ProcessSpawned { .. }
        | Event::ProcessExited { .. }
        | Event::SignalPosted { .. } => None,
    }
}

/// Print every event until the channel closes.
pub async fn render_events(mut events_rx: Receiver<Event>) {
    while let Some(event) = events_rx.recv().await {
        if let Some(line) = render_event(&event) {
            println!("{line}");
        }
    }
}
