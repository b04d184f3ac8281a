//! Pipeline stages and the run state machine.
//!
//! A run moves through the stages strictly in order:
//!
//! ```text
//! Idle -> ConfigLoading -> AppStarting -> ExtractionRunning -> DataGenerating
//!      -> UiStarting -> BrowserOpening -> Done
//! ```
//!
//! `Failed` is reachable from every non-terminal state and records where the
//! run stopped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One sequentially gated unit of the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    /// The target web application is being launched (fire-and-forget).
    AppStarting,

    /// DevTools and browser drivers are extracting the render tree.
    ExtractionRunning,

    /// The render tree is being transformed into `data.json`.
    DataGenerating,

    /// The suggestions UI service is being launched.
    UiStarting,

    /// The suggestions UI is being opened in the default browser.
    BrowserOpening,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::AppStarting,
        PipelineStage::ExtractionRunning,
        PipelineStage::DataGenerating,
        PipelineStage::UiStarting,
        PipelineStage::BrowserOpening,
    ];

    /// The stage that follows this one, or `None` for the last stage.
    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::AppStarting => Some(PipelineStage::ExtractionRunning),
            PipelineStage::ExtractionRunning => Some(PipelineStage::DataGenerating),
            PipelineStage::DataGenerating => Some(PipelineStage::UiStarting),
            PipelineStage::UiStarting => Some(PipelineStage::BrowserOpening),
            PipelineStage::BrowserOpening => None,
        }
    }

    /// Whether a process of this stage that cannot start or exits
    /// unsuccessfully aborts the run.
    ///
    /// App start failures are only logged because the target app may already
    /// be reachable from an earlier session. A missing browser opener only
    /// means the URL has to be opened by hand.
    pub fn is_fatal_on_failure(self) -> bool {
        matches!(
            self,
            PipelineStage::ExtractionRunning
                | PipelineStage::DataGenerating
                | PipelineStage::UiStarting
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::AppStarting => "app-start",
            PipelineStage::ExtractionRunning => "extraction",
            PipelineStage::DataGenerating => "data-generation",
            PipelineStage::UiStarting => "ui-start",
            PipelineStage::BrowserOpening => "browser-open",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The point at which a run failed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", content = "stage", rename_all = "camelCase")]
pub enum FailedAt {
    ConfigLoading,
    Stage(PipelineStage),
}

impl fmt::Display for FailedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedAt::ConfigLoading => f.write_str("config-loading"),
            FailedAt::Stage(stage) => stage.fmt(f),
        }
    }
}

/// Lifecycle state of a single analyzer run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum RunState {
    Idle,
    ConfigLoading,
    Running(PipelineStage),
    Done,
    Failed(FailedAt),
}

impl RunState {
    /// Where a failure in the current state would be attributed.
    ///
    /// Returns `None` for states a run cannot fail from.
    pub fn failure_point(self) -> Option<FailedAt> {
        match self {
            RunState::ConfigLoading => Some(FailedAt::ConfigLoading),
            RunState::Running(stage) => Some(FailedAt::Stage(stage)),
            RunState::Idle | RunState::Done | RunState::Failed(_) => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: RunState) -> bool {
        match (self, next) {
            (RunState::Idle, RunState::ConfigLoading) => true,
            (RunState::ConfigLoading, RunState::Running(PipelineStage::AppStarting)) => true,
            (RunState::Running(current), RunState::Running(following)) => {
                current.next() == Some(following)
            }
            (RunState::Running(PipelineStage::BrowserOpening), RunState::Done) => true,
            (current, RunState::Failed(at)) => current.failure_point() == Some(at),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::ConfigLoading => f.write_str("config-loading"),
            RunState::Running(stage) => stage.fmt(f),
            RunState::Done => f.write_str("done"),
            RunState::Failed(at) => write!(f, "failed({at})"),
        }
    }
}
