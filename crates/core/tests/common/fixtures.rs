//! Test fixtures: working directories, config files and shell collaborators.

use ba_core::collaborators::Collaborators;
use ba_core::engine::{PipelineOrchestrator, PipelineResult, RunOutcome};
use ba_core::process::CommandSpec;
use ba_protocol::config_models::CONFIG_FILE_NAME;
use ba_protocol::ipc::Event;
use ba_protocol::pipeline_models::PipelineStage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Fast timings so a full run finishes in well under a second.
pub const FAST_CONFIG: &str = r#"{
  "appStart": "sleep 30",
  "checkFile": 20,
  "handshakeTimeout": 5000,
  "dataGenWait": 0,
  "openUI": false
}"#;

/// Posts the signal file, writes the render tree, then lingers long enough
/// for the orchestrator to see the handshake.
pub const DEVTOOLS_OK: &str = r#"touch "$RENDER_TREE_PATH/$SIGNAL_FILE"
echo '{"tree":[]}' > "$RENDER_TREE_PATH/$RENDER_TREE_FILE"
sleep 0.3"#;

/// Waits for the signal file like the real browser driver does.
pub const BROWSER_OK: &str =
    r#"while [ ! -f "$RENDER_TREE_PATH/$SIGNAL_FILE" ]; do sleep 0.02; done"#;

/// Copies the render tree to the output path and records its flags.
pub const DATA_GENERATOR_OK: &str =
    r#"cp "$1" "$2" && echo "$3|$FILTER_SUGGESTIONS" > "$2.meta""#;

/// Records the requested port and keeps serving.
pub const UI_OK: &str = r#"echo "$2" > ui-port.txt; sleep 30"#;

/// Records the opened URL.
pub const OPENER_OK: &str = r#"echo "$1" > opened-url.txt"#;

/// A temporary working directory for one run.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// A project whose `analyzerConfig.json` contains `config`.
    pub fn with_config(config: &str) -> Self {
        let project = Self::new();
        std::fs::write(project.path().join(CONFIG_FILE_NAME), config).unwrap();
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Collaborators that succeed, running in the project directory.
    pub fn collaborators(&self) -> CollaboratorScripts {
        CollaboratorScripts {
            workdir: self.path().to_path_buf(),
            devtools: DEVTOOLS_OK.to_string(),
            browser: BROWSER_OK.to_string(),
            data_generator: DATA_GENERATOR_OK.to_string(),
            ui_service: UI_OK.to_string(),
            opener: Some(OPENER_OK.to_string()),
        }
    }
}

/// Shell scripts standing in for the npm/node collaborators.
///
/// Scripts run as `sh -c <script> <label> <appended args...>`, so arguments
/// the orchestrator appends show up as `$1`, `$2`, ...
pub struct CollaboratorScripts {
    pub workdir: PathBuf,
    pub devtools: String,
    pub browser: String,
    pub data_generator: String,
    pub ui_service: String,
    pub opener: Option<String>,
}

impl CollaboratorScripts {
    pub fn devtools(mut self, script: &str) -> Self {
        self.devtools = script.to_string();
        self
    }

    pub fn browser(mut self, script: &str) -> Self {
        self.browser = script.to_string();
        self
    }

    pub fn data_generator(mut self, script: &str) -> Self {
        self.data_generator = script.to_string();
        self
    }

    pub fn ui_service(mut self, script: &str) -> Self {
        self.ui_service = script.to_string();
        self
    }

    pub fn build(self) -> Collaborators {
        let script = |label: &str, stage: PipelineStage, body: &str| {
            CommandSpec::new(label, stage, "sh")
                .args(["-c", body, label])
                .current_dir(&self.workdir)
        };

        Collaborators {
            devtools: script("devtools", PipelineStage::ExtractionRunning, &self.devtools),
            browser: script("puppeteer", PipelineStage::ExtractionRunning, &self.browser),
            data_generator: script(
                "data-generator",
                PipelineStage::DataGenerating,
                &self.data_generator,
            ),
            ui_service: script("suggestions-ui", PipelineStage::UiStarting, &self.ui_service),
            opener: self
                .opener
                .as_deref()
                .map(|body| script("opener", PipelineStage::BrowserOpening, body)),
            data_output: self.workdir.join("data.json"),
        }
    }
}

/// Everything a test needs to inspect after a run.
pub struct RunResult {
    pub outcome: PipelineResult<RunOutcome>,
    pub events: Vec<Event>,
    pub orchestrator: PipelineOrchestrator,
}

/// Run the pipeline once and collect the events emitted so far.
pub async fn run_pipeline(workdir: &Path, collaborators: Collaborators) -> RunResult {
    let (events_tx, mut events_rx) = mpsc::channel(1024);
    let mut orchestrator = PipelineOrchestrator::new(workdir.to_path_buf(), collaborators, events_tx)
        .with_ui_settle_delay(Duration::from_millis(50))
        .with_shutdown_grace(Duration::from_secs(2));

    let outcome = tokio::time::timeout(Duration::from_secs(30), orchestrator.run())
        .await
        .expect("run should finish");

    let mut events = Vec::new();
    while let Ok(event) = events_rx.try_recv() {
        events.push(event);
    }

    RunResult {
        outcome,
        events,
        orchestrator,
    }
}

/// Poll until `path` exists with non-empty content, then return it trimmed.
pub async fn wait_for_file(path: &Path) -> String {
    for _ in 0..250 {
        if let Ok(content) = std::fs::read_to_string(path) {
            if !content.is_empty() {
                return content.trim().to_string();
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{} was never written", path.display());
}
