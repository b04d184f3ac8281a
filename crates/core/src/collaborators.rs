//! Launch templates for the external collaborators.
//!
//! The analyzer ships next to two JavaScript projects:
//!
//! ```text
//! <home>/
//! ├── advanced-bundle-analyzer/        DevTools + Puppeteer drivers, DataGenerator
//! └── advanced_bundle_analyzer_ui/     suggestions UI (reads src/components/data.json)
//! ```
//!
//! `<home>` is `$BUNDLE_ANALYZER_HOME` or the directory holding the
//! executable. The orchestrator appends run-specific arguments and
//! environment to the templates defined here.

use crate::process::CommandSpec;
use ba_protocol::pipeline_models::PipelineStage;
use ba_protocol::process_models::StdioMode;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the install location.
pub const ANALYZER_HOME_ENV: &str = "BUNDLE_ANALYZER_HOME";

/// Directory layout of an analyzer installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub analyzer_dir: PathBuf,
    pub ui_dir: PathBuf,
}

impl InstallLayout {
    pub fn at(home: &Path) -> Self {
        Self {
            analyzer_dir: home.join("advanced-bundle-analyzer"),
            ui_dir: home.join("advanced_bundle_analyzer_ui"),
        }
    }

    /// Locate the installation from the environment or the executable path.
    pub fn discover() -> std::io::Result<Self> {
        if let Some(home) = std::env::var_os(ANALYZER_HOME_ENV) {
            return Ok(Self::at(Path::new(&home)));
        }

        let exe = std::env::current_exe()?;
        let home = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::at(home))
    }

    pub fn data_generator_script(&self) -> PathBuf {
        self.analyzer_dir.join("js-build").join("DataGenerator.js")
    }

    /// Where the suggestions UI expects its data file.
    pub fn data_output(&self) -> PathBuf {
        self.ui_dir.join("src").join("components").join("data.json")
    }
}

/// Command templates for every collaborator of a run.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// React DevTools driver; receives the extraction environment.
    pub devtools: CommandSpec,

    /// Puppeteer driver; receives the extraction environment.
    pub browser: CommandSpec,

    /// Transform; the artifact path, output path and `--filter` are appended.
    pub data_generator: CommandSpec,

    /// Suggestions UI service; `-p <port>` is appended.
    pub ui_service: CommandSpec,

    /// Opens a URL in the default browser; the URL is appended.
    /// `None` when no opener exists on this system.
    pub opener: Option<CommandSpec>,

    /// Output path handed to the transform.
    pub data_output: PathBuf,
}

impl Collaborators {
    /// The npm/node based collaborators of a standard installation.
    pub fn from_layout(layout: &InstallLayout) -> Self {
        let devtools =
            CommandSpec::shell("devtools", PipelineStage::ExtractionRunning, "npm run devtools")
                .current_dir(&layout.analyzer_dir);

        let browser =
            CommandSpec::shell("puppeteer", PipelineStage::ExtractionRunning, "npm run puppeteer")
                .current_dir(&layout.analyzer_dir);

        let data_generator = CommandSpec::new("data-generator", PipelineStage::DataGenerating, "node")
            .arg(layout.data_generator_script().to_string_lossy())
            .current_dir(&layout.analyzer_dir);

        let ui_service = if cfg!(windows) {
            CommandSpec::new("suggestions-ui", PipelineStage::UiStarting, "cmd")
                .args(["/C", "npm", "run", "dev", "--"])
        } else {
            CommandSpec::new("suggestions-ui", PipelineStage::UiStarting, "npm")
                .args(["run", "dev", "--"])
        }
        .current_dir(&layout.ui_dir);

        Self {
            devtools,
            browser,
            data_generator,
            ui_service,
            opener: platform_opener(),
            data_output: layout.data_output(),
        }
    }
}

/// The platform's "open this URL" command, if installed.
pub fn platform_opener() -> Option<CommandSpec> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(windows) {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    };

    match which::which(program) {
        Ok(path) => Some(
            CommandSpec::new("opener", PipelineStage::BrowserOpening, path.to_string_lossy())
                .args(args.iter().copied())
                .stdio(StdioMode::Null),
        ),
        Err(err) => {
            debug!(program, error = %err, "no browser opener available");
            None
        }
    }
}
