//! Process supervisor: spawns, tracks, signals and reaps collaborators.

use crate::process::command::CommandSpec;
use crate::process::error::{ProcessError, ProcessResult};
use ba_protocol::pipeline_models::PipelineStage;
use ba_protocol::process_models::{ProcessExit, StdioMode};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch, Mutex};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Signal sent to a child's process group.
///
/// On platforms without signals every variant maps to a hard kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSignal {
    Terminate,
    Kill,
}

/// Observer for one spawned child.
///
/// Handles are cheap to clone; all clones observe the same exit status. The
/// child itself stays owned by the supervisor's background task until its
/// exit is observed.
#[derive(Debug, Clone)]
pub struct ChildHandle {
    id: Uuid,
    pid: Option<u32>,
    spec: Arc<CommandSpec>,
    exit_rx: watch::Receiver<Option<ProcessExit>>,
}

impl ChildHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn label(&self) -> &str {
        &self.spec.label
    }

    pub fn stage(&self) -> PipelineStage {
        self.spec.stage
    }

    /// The exit status, if the child has already exited.
    pub fn exit_status(&self) -> Option<ProcessExit> {
        *self.exit_rx.borrow()
    }

    /// Wait for the child to exit.
    ///
    /// Only this future is suspended; other children and timers keep running.
    pub async fn wait(&self) -> ProcessExit {
        wait_exit(self.exit_rx.clone()).await
    }
}

#[derive(Clone)]
struct TrackedChild {
    label: String,
    kill_tx: mpsc::UnboundedSender<KillSignal>,
    exit_rx: watch::Receiver<Option<ProcessExit>>,
}

/// Registry of running children.
///
/// Cloning the supervisor shares the registry, so one clone can shut down
/// children spawned through another.
#[derive(Clone, Default)]
pub struct ProcessSupervisor {
    /// Children that have not exited yet, indexed by handle id.
    children: Arc<Mutex<HashMap<Uuid, TrackedChild>>>,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a child described by `spec` and start tracking it.
    ///
    /// The child inherits the ambient environment plus `spec.env`, reads from
    /// `/dev/null`, and runs in its own process group on unix so that signals
    /// reach shell-wrapped grandchildren too.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Spawn` if the program cannot be started.
    pub async fn spawn(&self, spec: CommandSpec) -> ProcessResult<ChildHandle> {
        let mut command = build_command(&spec);

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            label: spec.label.clone(),
            command: spec.display_command(),
            source,
        })?;

        let pid = child.id();
        info!(
            child = %spec.label,
            stage = %spec.stage,
            pid = ?pid,
            command = %spec.display_command(),
            "spawned"
        );

        if let Some(stdout) = child.stdout.take() {
            forward_output(spec.label.clone(), "stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(spec.label.clone(), "stderr", stderr);
        }

        let id = Uuid::new_v4();
        let (exit_tx, exit_rx) = watch::channel(None);
        let (kill_tx, kill_rx) = mpsc::unbounded_channel();

        self.children.lock().await.insert(
            id,
            TrackedChild {
                label: spec.label.clone(),
                kill_tx,
                exit_rx: exit_rx.clone(),
            },
        );

        tokio::spawn(monitor(
            child,
            id,
            spec.label.clone(),
            kill_rx,
            exit_tx,
            Arc::clone(&self.children),
        ));

        Ok(ChildHandle {
            id,
            pid,
            spec: Arc::new(spec),
            exit_rx,
        })
    }

    /// Send `signal` to the child behind `handle`.
    ///
    /// Best-effort: a child that has already exited is silently ignored.
    pub async fn kill(&self, handle: &ChildHandle, signal: KillSignal) {
        let children = self.children.lock().await;
        match children.get(&handle.id) {
            Some(tracked) => {
                debug!(child = %tracked.label, ?signal, "sending signal");
                let _ = tracked.kill_tx.send(signal);
            }
            None => debug!(child = %handle.label(), "already exited, nothing to kill"),
        }
    }

    /// Number of children that have not exited yet.
    pub async fn active_count(&self) -> usize {
        self.children.lock().await.len()
    }

    /// Labels of children that have not exited yet.
    pub async fn active_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .children
            .lock()
            .await
            .values()
            .map(|tracked| tracked.label.clone())
            .collect();
        labels.sort();
        labels
    }

    /// Terminate every tracked child.
    ///
    /// Sends `Terminate` to all children, waits up to `grace` for them to
    /// exit, then sends `Kill` to the survivors and waits up to `grace` again.
    /// Returns the number of children that were still running.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        let tracked: Vec<TrackedChild> = self.children.lock().await.values().cloned().collect();

        if tracked.is_empty() {
            return 0;
        }

        for child in &tracked {
            info!(child = %child.label, "terminating");
            let _ = child.kill_tx.send(KillSignal::Terminate);
        }

        if !wait_all(&tracked, grace).await {
            for child in &tracked {
                if child.exit_rx.borrow().is_none() {
                    warn!(child = %child.label, "did not terminate in time, killing");
                    let _ = child.kill_tx.send(KillSignal::Kill);
                }
            }
            if !wait_all(&tracked, grace).await {
                warn!("some children survived shutdown");
            }
        }

        tracked.len()
    }
}

fn build_command(spec: &CommandSpec) -> Command {
    let mut command = std::process::Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(&spec.working_dir)
        .envs(spec.env.iter().map(|(key, value)| (key, value)))
        .stdin(Stdio::null());

    match spec.stdio {
        StdioMode::Null => command.stdout(Stdio::null()).stderr(Stdio::null()),
        StdioMode::Piped => command.stdout(Stdio::piped()).stderr(Stdio::piped()),
    };

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    Command::from(command)
}

/// Owns the child until it exits, relaying kill requests in the meantime.
async fn monitor(
    mut child: Child,
    id: Uuid,
    label: String,
    mut kill_rx: mpsc::UnboundedReceiver<KillSignal>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
    children: Arc<Mutex<HashMap<Uuid, TrackedChild>>>,
) {
    let exit = loop {
        tokio::select! {
            status = child.wait() => {
                break match status {
                    Ok(status) => ProcessExit::from(status),
                    Err(err) => {
                        warn!(child = %label, error = %err, "failed to observe exit");
                        ProcessExit::unknown()
                    }
                };
            }
            Some(signal) = kill_rx.recv() => deliver(&mut child, &label, signal),
        }
    };

    children.lock().await.remove(&id);
    debug!(child = %label, %exit, "exited");
    let _ = exit_tx.send(Some(exit));
}

#[cfg(unix)]
fn deliver(child: &mut Child, label: &str, signal: KillSignal) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // `id()` is `None` once the child has been reaped.
    let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    let signal = match signal {
        KillSignal::Terminate => Signal::SIGTERM,
        KillSignal::Kill => Signal::SIGKILL,
    };

    if let Err(err) = killpg(Pid::from_raw(pid), signal) {
        debug!(child = %label, error = %err, "signal delivery failed");
    }
}

#[cfg(not(unix))]
fn deliver(child: &mut Child, label: &str, _signal: KillSignal) {
    if let Err(err) = child.start_kill() {
        debug!(child = %label, error = %err, "kill failed");
    }
}

async fn wait_exit(mut exit_rx: watch::Receiver<Option<ProcessExit>>) -> ProcessExit {
    let status = match exit_rx.wait_for(Option::is_some).await {
        Ok(exit) => *exit,
        Err(_) => None,
    };
    status.unwrap_or_else(ProcessExit::unknown)
}

/// Returns `false` if `timeout` elapsed before every child exited.
async fn wait_all(tracked: &[TrackedChild], timeout: Duration) -> bool {
    let all = async {
        for child in tracked {
            wait_exit(child.exit_rx.clone()).await;
        }
    };
    tokio::time::timeout(timeout, all).await.is_ok()
}

/// Forward each non-empty output line of a child to the log.
fn forward_output<R>(label: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = LinesStream::new(BufReader::new(reader).lines());
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => info!(target: "collaborator", child = %label, stream, "{line}"),
                Err(err) => {
                    debug!(child = %label, error = %err, "stopped reading output");
                    break;
                }
            }
        }
    });
}
