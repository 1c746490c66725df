//! Subprocess spawning, stream capture and timeout enforcement

use super::monitor::ResourceMonitor;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::types::{ExecutionStats, ExecutionStatus};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Appended to a captured stream that hit the byte cap.
const TRUNCATION_MARKER: &[u8] = b"\n[output truncated]";

/// Grace period between SIGTERM and SIGKILL on the timeout path.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// A captured output stream, possibly cut off at the configured cap
#[derive(Debug, Clone, Default)]
pub struct CapturedStream {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

/// What one process run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub status: ExecutionStatus,
    /// Present only for `COMPLETED`; a signal death is reported as the
    /// negated signal number
    pub exit_code: Option<i32>,
    pub stdout: CapturedStream,
    pub stderr: CapturedStream,
    pub stats: ExecutionStats,
}

/// Runs a single command inside a workspace.
///
/// The child gets a working directory inside the workspace, stdio pipes,
/// its own process group (unix), and an environment reduced to the
/// configured allow-list — callers cannot smuggle host secrets in. Stdout
/// and stderr are drained concurrently with the process so a full pipe
/// buffer can never deadlock it.
pub struct ProcessRunner {
    timeout: Duration,
    max_captured_output_bytes: usize,
    env_allow_list: Vec<String>,
}

impl ProcessRunner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timeout: config.execution_timeout,
            max_captured_output_bytes: config.max_captured_output_bytes,
            env_allow_list: config.env_allow_list.clone(),
        }
    }

    /// Run `command` with `cwd` as its working directory.
    ///
    /// A spawn failure is reported as a `FAILED_TO_START` outcome, not an
    /// error; exceeding the wall-clock bound terminates the whole process
    /// group and reports `TIMED_OUT` with whatever output was captured.
    pub async fn run(&self, command: &[String], cwd: &Path) -> EngineResult<RunOutcome> {
        let (program, args) = command.split_first().ok_or(EngineError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env_clear()
            .kill_on_drop(true);
        for key in &self.env_allow_list {
            if let Ok(value) = std::env::var(key) {
                cmd.env(key, value);
            }
        }
        // Own process group, so the timeout path can signal the whole tree
        // and not just the direct child.
        #[cfg(unix)]
        cmd.process_group(0);

        let started_at = Utc::now();
        let start = Instant::now();

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(program = %program, error = %e, "failed to spawn command");
                return Ok(RunOutcome {
                    status: ExecutionStatus::FailedToStart,
                    exit_code: None,
                    stdout: CapturedStream::default(),
                    stderr: CapturedStream {
                        bytes: format!("failed to start {}: {}", program, e).into_bytes(),
                        truncated: false,
                    },
                    stats: empty_stats(started_at),
                });
            }
        };
        let pid = child.id();

        let monitor = pid.map(ResourceMonitor::spawn);

        let cap = self.max_captured_output_bytes;
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_task = tokio::spawn(async move {
            match stdout_pipe {
                Some(pipe) => drain_capped(pipe, cap).await,
                None => CapturedStream::default(),
            }
        });
        let stderr_task = tokio::spawn(async move {
            match stderr_pipe {
                Some(pipe) => drain_capped(pipe, cap).await,
                None => CapturedStream::default(),
            }
        });

        let (status, exit_code) = match timeout(self.timeout, child.wait()).await {
            Ok(Ok(exit)) => (ExecutionStatus::Completed, Some(exit_code_of(&exit))),
            Ok(Err(e)) => {
                return Err(EngineError::Internal(format!("process wait failed: {}", e)));
            }
            Err(_) => {
                warn!(?pid, timeout = ?self.timeout, "command timed out, killing process group");
                kill_process_group(&mut child, pid).await;
                (ExecutionStatus::TimedOut, None)
            }
        };

        let duration = start.elapsed();
        let finished_at = Utc::now();

        let usage = match monitor {
            Some(monitor) => monitor.finish().await,
            None => Default::default(),
        };
        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        Ok(RunOutcome {
            status,
            exit_code,
            stdout,
            stderr,
            stats: ExecutionStats {
                started_at,
                finished_at,
                duration_secs: duration.as_secs_f64(),
                max_rss_kb: usage.max_rss_kb,
                cpu_user_secs: usage.cpu_user_secs,
            },
        })
    }
}

/// Read a pipe to EOF, keeping at most `cap` bytes.
///
/// Draining continues past the cap so a chatty child never blocks on a
/// full pipe buffer; overflow sets the truncation flag and the marker is
/// appended once at the end.
async fn drain_capped<R>(mut reader: R, cap: usize) -> CapturedStream
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut stream = CapturedStream::default();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let room = cap.saturating_sub(stream.bytes.len());
                if room >= n {
                    stream.bytes.extend_from_slice(&chunk[..n]);
                } else {
                    stream.bytes.extend_from_slice(&chunk[..room]);
                    stream.truncated = true;
                }
            }
            Err(_) => break,
        }
    }
    if stream.truncated {
        stream.bytes.extend_from_slice(TRUNCATION_MARKER);
    }
    stream
}

/// Map an exit status to the reported code; a signal death becomes `-N`.
fn exit_code_of(status: &std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

/// Terminate the child's whole process group: SIGTERM first, a bounded
/// grace period, then SIGKILL, then reap.
#[cfg(unix)]
async fn kill_process_group(child: &mut Child, pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid else {
        let _ = child.kill().await;
        return;
    };
    // The child was spawned as its own process-group leader, so pgid == pid.
    let pgid = Pid::from_raw(pid as i32);
    let _ = killpg(pgid, Signal::SIGTERM);
    if timeout(KILL_GRACE, child.wait()).await.is_err() {
        let _ = killpg(pgid, Signal::SIGKILL);
        let _ = child.wait().await;
    }
}

#[cfg(not(unix))]
async fn kill_process_group(child: &mut Child, _pid: Option<u32>) {
    let _ = child.kill().await;
}

fn empty_stats(started_at: DateTime<Utc>) -> ExecutionStats {
    ExecutionStats {
        started_at,
        finished_at: started_at,
        duration_secs: 0.0,
        max_rss_kb: None,
        cpu_user_secs: None,
    }
}
