//! `analyze`: runs the bundle analyzer pipeline in the current directory.

mod render;

use ba_core::collaborators::{Collaborators, InstallLayout};
use ba_core::engine::{PipelineOrchestrator, RunOutcome};
use clap::Parser;
use color_eyre::eyre::WrapErr;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Analyze the React webapp in the current directory and open the
/// suggestions UI.
///
/// The first run writes a default `analyzerConfig.json` and exits.
#[derive(Parser, Debug)]
#[command(name = "analyze", version, about)]
struct Cli {}

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let workdir = std::env::current_dir().wrap_err("Failed to read the working directory")?;
    let layout = InstallLayout::discover().wrap_err("Failed to locate the analyzer installation")?;
    debug!(?layout, "using installation");

    let (events_tx, events_rx) = mpsc::channel(256);
    let renderer = tokio::spawn(render::render_events(events_rx));

    let mut orchestrator =
        PipelineOrchestrator::new(workdir, Collaborators::from_layout(&layout), events_tx);

    let outcome = tokio::select! {
        outcome = orchestrator.run() => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };

    let code = match outcome {
        Some(Ok(RunOutcome::ConfigCreated { .. })) => ExitCode::SUCCESS,
        Some(Ok(RunOutcome::Completed(report))) => {
            orchestrator.supervise(&report).await;
            ExitCode::SUCCESS
        }
        // Already reported through the event stream.
        Some(Err(err)) => {
            debug!(error = ?err, "run failed");
            ExitCode::FAILURE
        }
        None => {
            info!("interrupted, shutting down");
            orchestrator.shutdown().await;
            ExitCode::FAILURE
        }
    };

    drop(orchestrator);
    let _ = tokio::time::timeout(Duration::from_secs(1), renderer).await;

    Ok(code)
}
