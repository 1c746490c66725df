//! Engine configuration
//!
//! Supplied by the host once at startup; never renegotiated per request.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the execution engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base directory under which per-execution workspaces are created
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Wall-clock bound per execution
    #[serde(with = "humantime_serde", default = "default_execution_timeout")]
    pub execution_timeout: Duration,

    /// Per-stream byte cap for captured stdout/stderr; overflow is truncated
    /// with a marker, not an error
    #[serde(default = "default_max_captured_output_bytes")]
    pub max_captured_output_bytes: usize,

    /// Environment variables passed through to spawned processes; everything
    /// else is stripped
    #[serde(default = "default_env_allow_list")]
    pub env_allow_list: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            execution_timeout: default_execution_timeout(),
            max_captured_output_bytes: default_max_captured_output_bytes(),
            env_allow_list: default_env_allow_list(),
        }
    }
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("runbox")
}

fn default_execution_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_max_captured_output_bytes() -> usize {
    1024 * 1024 // 1 MiB per stream
}

fn default_env_allow_list() -> Vec<String> {
    ["PATH", "HOME", "USER", "LANG", "LC_ALL", "TERM", "TZ"]
        .into_iter()
        .map(String::from)
        .collect()
}
