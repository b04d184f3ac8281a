//! Pipeline orchestration engine.
//!
//! The `PipelineOrchestrator` drives one analyzer run through its stages,
//! spawning collaborators through the `ProcessSupervisor`, gating on the
//! signal file and the render tree artifact, and reporting every state
//! change on an event channel.

pub mod environment;
pub mod error;

pub use error::{PipelineError, PipelineResult};

use crate::collaborators::Collaborators;
use crate::config::{self, ConfigOutcome};
use crate::gate::{remove_stale_artifact, GateError, SignalFile};
use crate::process::{ChildHandle, CommandSpec, KillSignal, ProcessSupervisor};
use ba_protocol::config_models::{AnalyzerConfig, CONFIG_FILE_NAME};
use ba_protocol::ipc::Event;
use ba_protocol::pipeline_models::{FailedAt, PipelineStage, RunState};
use ba_protocol::process_models::ProcessExit;
use chrono::Utc;
use environment::{app_env, data_generation_env, extraction_env};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info, warn};

const DEFAULT_UI_SETTLE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// How a run ended when it did not fail.
#[derive(Debug)]
pub enum RunOutcome {
    /// No configuration existed; the default file was written and nothing ran.
    ConfigCreated { path: PathBuf },

    /// Every stage succeeded.
    Completed(RunReport),
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Where the suggestions UI can be browsed.
    pub ui_url: String,

    /// The still running suggestions UI service.
    pub ui_service: ChildHandle,

    /// Whether a browser opener was launched.
    pub opened: bool,
}

/// Drives one analyzer run from configuration loading to the opened UI.
///
/// # Example
///
/// ```rust,no_run
/// use ba_core::collaborators::{Collaborators, InstallLayout};
/// use ba_core::engine::{PipelineOrchestrator, RunOutcome};
/// use tokio::sync::mpsc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let collaborators = Collaborators::from_layout(&InstallLayout::discover()?);
/// let (events_tx, _events_rx) = mpsc::channel(256);
/// let mut orchestrator =
///     PipelineOrchestrator::new(std::env::current_dir()?, collaborators, events_tx);
///
/// if let RunOutcome::Completed(report) = orchestrator.run().await? {
///     orchestrator.supervise(&report).await;
/// }
/// # Ok(())
/// # }
/// ```
pub struct PipelineOrchestrator {
    workdir: PathBuf,
    collaborators: Collaborators,
    supervisor: ProcessSupervisor,
    events_tx: Sender<Event>,
    state: RunState,
    config: Option<Arc<AnalyzerConfig>>,
    signal: Option<SignalFile>,
    ui_settle_delay: Duration,
    shutdown_grace: Duration,
}

impl PipelineOrchestrator {
    /// Create an orchestrator for a run in `workdir`.
    ///
    /// # Arguments
    ///
    /// * `workdir` - Directory holding `analyzerConfig.json` and the render tree
    /// * `collaborators` - Launch templates for the external processes
    /// * `events_tx` - Channel receiving progress events
    pub fn new(workdir: PathBuf, collaborators: Collaborators, events_tx: Sender<Event>) -> Self {
        Self {
            workdir,
            collaborators,
            supervisor: ProcessSupervisor::new(),
            events_tx,
            state: RunState::Idle,
            config: None,
            signal: None,
            ui_settle_delay: DEFAULT_UI_SETTLE_DELAY,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Time given to the UI service to come up before the browser is opened.
    pub fn with_ui_settle_delay(mut self, delay: Duration) -> Self {
        self.ui_settle_delay = delay;
        self
    }

    /// Time children get to exit after SIGTERM before they are killed.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The configuration of the current run, once loaded.
    pub fn config(&self) -> Option<Arc<AnalyzerConfig>> {
        self.config.clone()
    }

    /// A handle on the registry of spawned children.
    pub fn supervisor(&self) -> ProcessSupervisor {
        self.supervisor.clone()
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Execute the run.
    ///
    /// # Returns
    ///
    /// - `RunOutcome::ConfigCreated` when no configuration file existed.
    /// - `RunOutcome::Completed` once the UI is up; the UI service keeps
    ///   running and is still tracked by the supervisor.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage. By then the state is
    /// `Failed`, every tracked child has been terminated and the signal file
    /// has been removed.
    pub async fn run(&mut self) -> PipelineResult<RunOutcome> {
        let started_at = Utc::now();
        self.transition(RunState::ConfigLoading).await;

        let config = match self.load_config().await {
            Ok(Some(config)) => config,
            Ok(None) => {
                let path = self.workdir.join(CONFIG_FILE_NAME);
                return Ok(RunOutcome::ConfigCreated { path });
            }
            Err(err) => return Err(self.fail(err).await),
        };

        let signal = SignalFile::for_run(&self.workdir, started_at);
        self.signal = Some(signal.clone());

        let result = self.run_stages(&config, &signal).await;
        self.clear_signal().await;

        match result {
            Ok(report) => Ok(RunOutcome::Completed(report)),
            Err(err) => Err(self.fail(err).await),
        }
    }

    /// Keep the run alive until the UI service exits or Ctrl-C is pressed,
    /// then shut everything down.
    pub async fn supervise(&mut self, report: &RunReport) {
        tokio::select! {
            exit = report.ui_service.wait() => {
                info!(%exit, "suggestions UI exited");
            }
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("interrupted, shutting down"),
                Err(err) => warn!(error = %err, "failed to listen for Ctrl-C"),
            },
        }

        self.shutdown().await;
    }

    /// Terminate every tracked child and remove the signal file.
    ///
    /// Safe to call at any point, including after a run future was dropped.
    pub async fn shutdown(&mut self) {
        let stopped = self.supervisor.shutdown(self.shutdown_grace).await;
        if stopped > 0 {
            info!(count = stopped, "terminated child processes");
        }
        self.clear_signal().await;
    }

    async fn load_config(&mut self) -> PipelineResult<Option<Arc<AnalyzerConfig>>> {
        let path = self.workdir.join(CONFIG_FILE_NAME);

        match config::resolve(&path)? {
            ConfigOutcome::Loaded { config, path } => {
                info!(path = %path.display(), "loaded configuration");
                self.emit(Event::ConfigLoaded { path }).await;

                let config = Arc::new(config);
                self.config = Some(Arc::clone(&config));
                Ok(Some(config))
            }
            ConfigOutcome::CreatedDefault { path } => {
                info!(path = %path.display(), "created default configuration");
                self.emit(Event::ConfigCreated { path }).await;
                Ok(None)
            }
        }
    }

    async fn run_stages(
        &mut self,
        config: &AnalyzerConfig,
        signal: &SignalFile,
    ) -> PipelineResult<RunReport> {
        self.remove_stale_render_tree(config).await?;

        self.transition(RunState::Running(PipelineStage::AppStarting))
            .await;
        let app = self.start_app(config).await?;

        self.transition(RunState::Running(PipelineStage::ExtractionRunning))
            .await;
        self.run_extraction(config, signal).await?;
        if let Some(app) = &app {
            self.supervisor.kill(app, KillSignal::Terminate).await;
        }
        tokio::time::sleep(config.data_gen_wait()).await;

        self.transition(RunState::Running(PipelineStage::DataGenerating))
            .await;
        self.run_data_generation(config).await?;

        self.transition(RunState::Running(PipelineStage::UiStarting))
            .await;
        let ui_service = self.start_ui(config).await?;
        tokio::time::sleep(self.ui_settle_delay).await;

        self.transition(RunState::Running(PipelineStage::BrowserOpening))
            .await;
        let ui_url = config.ui_url();
        let opened = self.open_browser(config, &ui_url).await?;
        info!(url = %ui_url, opened, "suggestions UI ready");
        self.emit(Event::UiReady {
            url: ui_url.clone(),
            opened,
        })
        .await;

        self.transition(RunState::Done).await;

        Ok(RunReport {
            ui_url,
            ui_service,
            opened,
        })
    }

    /// Delete the render tree of a previous run. Runs while still in
    /// `ConfigLoading`, so a failure is attributed there.
    async fn remove_stale_render_tree(&mut self, config: &AnalyzerConfig) -> PipelineResult<()> {
        let artifact = self.workdir.join(&config.render_tree_file);
        let removed = remove_stale_artifact(&artifact)
            .await
            .map_err(gate_failure(FailedAt::ConfigLoading))?;
        if removed {
            self.emit(Event::StaleArtifactRemoved { path: artifact }).await;
        }
        Ok(())
    }

    /// Launch the app without waiting on it.
    async fn start_app(&mut self, config: &AnalyzerConfig) -> PipelineResult<Option<ChildHandle>> {
        let spec = CommandSpec::shell("app", PipelineStage::AppStarting, &config.app_start)
            .current_dir(&self.workdir)
            .envs(app_env());

        let app = self.spawn_stage(spec).await?;
        if let Some(handle) = &app {
            self.watch_detached(handle.clone());
        }
        Ok(app)
    }

    /// Run both extraction drivers and wait for them and the handshake.
    async fn run_extraction(
        &mut self,
        config: &AnalyzerConfig,
        signal: &SignalFile,
    ) -> PipelineResult<()> {
        let extraction_gate = gate_failure(FailedAt::Stage(PipelineStage::ExtractionRunning));
        if signal.clear().await.map_err(extraction_gate)? {
            debug!(path = %signal.path().display(), "removed leftover signal file");
        }

        let env = extraction_env(config, &self.workdir, signal);
        let devtools = self
            .spawn_required(self.collaborators.devtools.clone().envs(env.clone()))
            .await?;
        let browser = self
            .spawn_required(self.collaborators.browser.clone().envs(env))
            .await?;

        let handshake = signal.wait_posted(config.check_file_interval(), config.handshake_timeout());
        tokio::pin!(handshake);

        let mut posted = false;
        let mut devtools_done = false;
        let mut browser_done = false;

        while !(devtools_done && browser_done) {
            tokio::select! {
                exit = devtools.wait(), if !devtools_done => {
                    devtools_done = true;
                    self.require_success(&devtools, exit).await?;
                }
                exit = browser.wait(), if !browser_done => {
                    browser_done = true;
                    self.require_success(&browser, exit).await?;
                }
                result = &mut handshake, if !posted => {
                    result.map_err(extraction_gate)?;
                    posted = true;
                    self.emit(Event::SignalPosted { path: signal.path().to_path_buf() }).await;
                }
            }
        }

        if !posted {
            warn!(
                path = %signal.path().display(),
                "extraction drivers finished without posting the signal file"
            );
        }

        Ok(())
    }

    async fn run_data_generation(&mut self, config: &AnalyzerConfig) -> PipelineResult<()> {
        let artifact = self.workdir.join(&config.render_tree_file);
        let mut spec = self
            .collaborators
            .data_generator
            .clone()
            .arg(artifact.to_string_lossy())
            .arg(self.collaborators.data_output.to_string_lossy())
            .envs(data_generation_env(config));
        if config.filter_suggestions {
            spec = spec.arg("--filter");
        }

        let handle = self.spawn_required(spec).await?;
        let exit = handle.wait().await;
        self.require_success(&handle, exit).await
    }

    /// Launch the UI service; its exit is observed in the background.
    async fn start_ui(&mut self, config: &AnalyzerConfig) -> PipelineResult<ChildHandle> {
        let spec = self
            .collaborators
            .ui_service
            .clone()
            .args(["-p".to_string(), config.ui_port.to_string()]);

        let handle = self.spawn_required(spec).await?;
        self.watch_detached(handle.clone());
        Ok(handle)
    }

    /// Returns whether an opener was launched.
    async fn open_browser(&mut self, config: &AnalyzerConfig, url: &str) -> PipelineResult<bool> {
        if !config.open_ui {
            return Ok(false);
        }

        let Some(opener) = self.collaborators.opener.clone() else {
            warn!("no browser opener found, open the URL manually");
            return Ok(false);
        };

        match self.spawn_stage(opener.arg(url)).await? {
            Some(handle) => {
                self.watch_detached(handle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Spawn a child, applying its stage's failure policy to spawn errors.
    ///
    /// Returns `Ok(None)` when the child could not start but its stage
    /// tolerates that.
    async fn spawn_stage(&self, spec: CommandSpec) -> PipelineResult<Option<ChildHandle>> {
        let stage = spec.stage;
        match self.spawn_required(spec).await {
            Ok(handle) => Ok(Some(handle)),
            Err(err) if stage.is_fatal_on_failure() => Err(err),
            Err(err) => {
                warn!(%stage, error = %err, "spawn failed, continuing");
                Ok(None)
            }
        }
    }

    async fn spawn_required(&self, spec: CommandSpec) -> PipelineResult<ChildHandle> {
        let stage = spec.stage;
        let handle = self
            .supervisor
            .spawn(spec)
            .await
            .map_err(|source| PipelineError::Spawn { stage, source })?;
        self.announce(&handle).await;
        Ok(handle)
    }

    async fn require_success(&self, handle: &ChildHandle, exit: ProcessExit) -> PipelineResult<()> {
        self.emit(Event::ProcessExited {
            id: handle.id(),
            label: handle.label().to_string(),
            stage: handle.stage(),
            exit,
        })
        .await;

        if exit.success() {
            info!(child = %handle.label(), "finished");
            Ok(())
        } else {
            Err(PipelineError::StageExit {
                stage: handle.stage(),
                label: handle.label().to_string(),
                exit,
            })
        }
    }

    async fn announce(&self, handle: &ChildHandle) {
        self.emit(Event::ProcessSpawned {
            id: handle.id(),
            label: handle.label().to_string(),
            stage: handle.stage(),
            pid: handle.pid(),
        })
        .await;
    }

    /// Report the exit of a child nobody waits on.
    fn watch_detached(&self, handle: ChildHandle) {
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let exit = handle.wait().await;
            info!(child = %handle.label(), %exit, "exited");
            let _ = events_tx
                .send(Event::ProcessExited {
                    id: handle.id(),
                    label: handle.label().to_string(),
                    stage: handle.stage(),
                    exit,
                })
                .await;
        });
    }

    async fn fail(&mut self, err: PipelineError) -> PipelineError {
        if let Some(at) = self.state.failure_point() {
            error!(stage = %at, error = %err, "run failed");
            self.transition(RunState::Failed(at)).await;
            self.emit(Event::RunFailed {
                at,
                error: err.to_string(),
            })
            .await;
        }

        self.shutdown().await;
        err
    }

    async fn clear_signal(&mut self) {
        let Some(signal) = self.signal.take() else {
            return;
        };
        if let Err(err) = signal.clear().await {
            warn!(error = %err, "failed to remove signal file");
        }
    }

    async fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
        self.emit(Event::StateChanged { state: next }).await;
    }

    async fn emit(&self, event: Event) {
        let _ = self.events_tx.send(event).await;
    }
}

fn gate_failure(at: FailedAt) -> impl Fn(GateError) -> PipelineError + Copy {
    move |source| PipelineError::Gate { at, source }
}
