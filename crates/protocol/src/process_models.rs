//! Models describing spawned child processes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a child's standard streams are wired.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StdioMode {
    /// Discard all output.
    Null,

    /// Capture stdout/stderr and forward each line to the log.
    #[default]
    Piped,
}

/// Final status of a child process.
///
/// Exactly one of `code` and `signal` is normally set: `code` when the process
/// exited on its own, `signal` when it was terminated by a signal (unix only).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ProcessExit {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Status reported when the exit could not be observed.
    pub fn unknown() -> Self {
        Self {
            code: None,
            signal: None,
        }
    }

    /// Only a clean exit with code 0 counts as success.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessExit {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::from_signal(signal);
            }
        }

        Self {
            code: status.code(),
            signal: None,
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => write!(f, "unknown exit status"),
        }
    }
}
