//! Boundary types exchanged with the engine
//!
//! These two structures, [`ExecutionRequest`] in and [`ExecutionResult`]
//! out, are the engine's whole surface towards the transport layer. Both
//! derive serde so hosts can map them onto whatever wire format they speak;
//! base64/multipart handling of file bytes belongs to that layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single input file to materialize before execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFile {
    /// Path relative to the workspace root
    pub relative_path: String,
    /// Raw file bytes
    pub content: Vec<u8>,
}

/// One command execution as submitted by a caller.
///
/// Immutable once built; the engine never mutates a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Program name followed by its arguments; must be non-empty
    pub command: Vec<String>,

    /// Files written into the workspace before the command runs
    #[serde(default)]
    pub input_files: Vec<InputFile>,

    /// Relative paths to read back after the command exits; may name paths
    /// the command never creates
    #[serde(default)]
    pub output_files: Vec<String>,

    /// Optional workspace-relative subdirectory used as the working
    /// directory for the command
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl ExecutionRequest {
    /// The space-joined command line, for logs and result echo
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Terminal classification of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// The process ran to termination; see `exit_code` for how it ended
    Completed,
    /// The process exceeded the wall-clock bound and was killed
    TimedOut,
    /// The executable could not be located or spawned
    FailedToStart,
}

/// Timing and resource telemetry for the spawned process.
///
/// Timestamps bound the process's lifetime, not staging or harvesting.
/// Resource fields are best-effort and stay `None` on platforms where they
/// cannot be measured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Wall-clock time just before the process was spawned
    pub started_at: DateTime<Utc>,
    /// Wall-clock time after the process terminated
    pub finished_at: DateTime<Utc>,
    /// Process lifetime, measured on the monotonic clock
    pub duration_secs: f64,
    /// Peak resident set size in kilobytes
    pub max_rss_kb: Option<u64>,
    /// Accumulated user-mode CPU seconds
    pub cpu_user_secs: Option<f64>,
}

/// A requested output file that existed after execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFile {
    /// Path relative to the workspace root, as requested by the caller
    pub relative_path: String,
    /// Raw file bytes
    pub content: Vec<u8>,
}

/// The single terminal value of one execution.
///
/// A non-zero exit code is a normal, successfully-reported outcome here;
/// whether it constitutes failure is the caller's decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// How the execution ended
    pub status: ExecutionStatus,

    /// Exit code, present only for `COMPLETED`. A process killed by signal
    /// N is reported as `-N`.
    pub exit_code: Option<i32>,

    /// Captured standard output, capped at the configured byte limit
    pub stdout: Vec<u8>,
    /// Captured standard error, capped at the configured byte limit
    pub stderr: Vec<u8>,
    /// Whether stdout hit the capture cap
    pub stdout_truncated: bool,
    /// Whether stderr hit the capture cap
    pub stderr_truncated: bool,

    /// Echo of the executed command, space-joined
    pub command: String,

    /// Requested output files that existed, in request order
    pub output_files: Vec<OutputFile>,
    /// Requested output files that did not exist, in request order
    pub missing_files: Vec<String>,

    /// Best-effort execution telemetry
    pub stats: ExecutionStats,
}

impl ExecutionResult {
    /// Whether the command ran to completion and exited zero
    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Completed && self.exit_code == Some(0)
    }

    /// Captured stdout as text, with invalid UTF-8 replaced
    pub fn stdout_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Captured stderr as text, with invalid UTF-8 replaced
    pub fn stderr_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}
