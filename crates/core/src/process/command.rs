//! Launch description for a child process.

use ba_protocol::pipeline_models::PipelineStage;
use ba_protocol::process_models::StdioMode;
use std::path::{Path, PathBuf};

/// Everything needed to spawn one collaborator.
///
/// The spawned process inherits the orchestrator's environment; `env` holds
/// only the stage-specific additions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Short name used in logs and events (e.g. `devtools`).
    pub label: String,

    /// Stage the process belongs to.
    pub stage: PipelineStage,

    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,

    /// Environment additions on top of the ambient environment.
    pub env: Vec<(String, String)>,

    pub stdio: StdioMode,
}

impl CommandSpec {
    /// Create a spec running `program` directly in the current directory.
    pub fn new(label: impl Into<String>, stage: PipelineStage, program: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            stage,
            program: program.into(),
            args: Vec::new(),
            working_dir: PathBuf::from("."),
            env: Vec::new(),
            stdio: StdioMode::default(),
        }
    }

    /// Create a spec that runs `command_line` through the platform shell.
    ///
    /// Uses `sh -c` on unix and `cmd /C` on Windows, so commands such as
    /// `npm start` resolve the same way they do in a terminal.
    pub fn shell(label: impl Into<String>, stage: PipelineStage, command_line: &str) -> Self {
        if cfg!(windows) {
            Self::new(label, stage, "cmd").args(["/C", command_line])
        } else {
            Self::new(label, stage, "sh").args(["-c", command_line])
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Add or replace one environment variable in the overlay.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.env.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.env.push((key, value)),
        }
        self
    }

    pub fn envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        vars.into_iter()
            .fold(self, |spec, (key, value)| spec.env(key, value))
    }

    pub fn stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }

    /// Human readable command line, used in logs and error messages.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
