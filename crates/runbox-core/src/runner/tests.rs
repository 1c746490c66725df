//! Tests for the process runner

use crate::config::EngineConfig;
use crate::runner::ProcessRunner;
use crate::types::ExecutionStatus;
use std::time::{Duration, Instant};

fn config() -> EngineConfig {
    EngineConfig {
        execution_timeout: Duration::from_secs(10),
        ..EngineConfig::default()
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn simple_command_completes_with_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&config());
    let outcome = runner
        .run(&argv(&["echo", "hello"]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(outcome.stdout.bytes, b"hello\n");
    assert!(!outcome.stdout.truncated);
}

#[tokio::test]
async fn nonzero_exit_is_reported_not_errored() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&config());
    let outcome = runner
        .run(&argv(&["sh", "-c", "exit 3"]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.exit_code, Some(3));
}

#[tokio::test]
async fn stderr_is_captured_separately() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&config());
    let outcome = runner
        .run(&argv(&["sh", "-c", "echo out; echo err >&2"]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.stdout.bytes, b"out\n");
    assert_eq!(outcome.stderr.bytes, b"err\n");
}

#[tokio::test]
async fn missing_executable_is_failed_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&config());
    let outcome = runner
        .run(&argv(&["definitely-not-a-real-binary"]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::FailedToStart);
    assert_eq!(outcome.exit_code, None);
    assert!(!outcome.stderr.bytes.is_empty());
}

#[tokio::test]
async fn timeout_kills_the_process_group_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&EngineConfig {
        execution_timeout: Duration::from_secs(1),
        ..EngineConfig::default()
    });

    let start = Instant::now();
    let outcome = runner
        .run(&argv(&["sleep", "10"]), dir.path())
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert_eq!(outcome.exit_code, None);
    // Timeout plus grace period, nowhere near the sleep's 10s.
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
}

#[tokio::test]
async fn timeout_reaps_spawned_children() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&EngineConfig {
        execution_timeout: Duration::from_millis(300),
        ..EngineConfig::default()
    });

    // The shell spawns a grandchild; killing only the shell would leave it
    // holding the stdout pipe and the drain would hang until the full 10s.
    let start = Instant::now();
    let outcome = runner
        .run(&argv(&["sh", "-c", "sleep 10 & wait"]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn output_over_cap_is_truncated_with_marker() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&EngineConfig {
        max_captured_output_bytes: 64,
        ..config()
    });
    let outcome = runner
        .run(&argv(&["sh", "-c", "yes x | head -c 8192"]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert!(outcome.stdout.truncated);
    assert!(outcome.stdout.bytes.ends_with(b"[output truncated]"));
    assert!(outcome.stdout.bytes.len() < 64 + 32);
}

#[tokio::test]
async fn environment_is_reduced_to_the_allow_list() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&EngineConfig {
        env_allow_list: vec!["PATH".to_string()],
        ..config()
    });
    // HOME is set in any normal test environment but is not allow-listed.
    let outcome = runner
        .run(&argv(&["sh", "-c", "echo \"${HOME:-unset}\""]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.stdout.bytes, b"unset\n");
}

#[cfg(unix)]
#[tokio::test]
async fn signal_death_reports_negated_signal() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&config());
    let outcome = runner
        .run(&argv(&["sh", "-c", "kill -9 $$"]), dir.path())
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert_eq!(outcome.exit_code, Some(-9));
}

#[tokio::test]
async fn stats_bound_the_process_lifetime() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&config());
    let outcome = runner
        .run(&argv(&["sleep", "0.2"]), dir.path())
        .await
        .unwrap();

    assert!(outcome.stats.duration_secs >= 0.15);
    assert!(outcome.stats.duration_secs < 5.0);
    assert!(outcome.stats.started_at <= outcome.stats.finished_at);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn resource_usage_is_sampled_on_linux() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new(&config());
    let outcome = runner
        .run(&argv(&["sleep", "0.3"]), dir.path())
        .await
        .unwrap();

    assert!(outcome.stats.max_rss_kb.unwrap_or(0) > 0);
    assert!(outcome.stats.cpu_user_secs.is_some());
}
