//! Best-effort resource sampling for a running process
//!
//! On Linux the monitor polls `/proc/<pid>` while the process runs; peak
//! RSS comes from the `VmHWM` high-water mark and user CPU time from the
//! `utime` field of `stat`. Other platforms report nothing — a degraded
//! sample is never a failure. Sampling is per-pid with no shared state, so
//! concurrent executions never serialize on it.

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Sampling cadence; small relative to any realistic execution timeout.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

/// Peak usage observed for one process
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageSample {
    /// Peak resident set size in kilobytes
    pub max_rss_kb: Option<u64>,
    /// Accumulated user-mode CPU seconds
    pub cpu_user_secs: Option<f64>,
}

/// Polls a process's resource counters on a background task while it runs.
#[derive(Debug)]
pub struct ResourceMonitor {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<UsageSample>,
}

impl ResourceMonitor {
    /// Start sampling `pid`. The first sample is taken immediately, so
    /// even short-lived commands usually get one observation.
    pub fn spawn(pid: u32) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut sample = UsageSample::default();
            let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if let Some(observed) = sample_pid(pid) {
                            sample.max_rss_kb = sample.max_rss_kb.max(observed.max_rss_kb);
                            if observed.cpu_user_secs.is_some() {
                                sample.cpu_user_secs = observed.cpu_user_secs;
                            }
                        }
                    }
                }
            }
            sample
        });
        Self { stop_tx, handle }
    }

    /// Stop sampling and return the peak observations.
    pub async fn finish(self) -> UsageSample {
        let _ = self.stop_tx.send(());
        self.handle.await.unwrap_or_default()
    }
}

#[cfg(target_os = "linux")]
fn sample_pid(pid: u32) -> Option<UsageSample> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    let max_rss_kb = status
        .lines()
        .find(|line| line.starts_with("VmHWM:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok());

    let cpu_user_secs = std::fs::read_to_string(format!("/proc/{}/stat", pid))
        .ok()
        .as_deref()
        .and_then(parse_utime_ticks)
        .map(|ticks| ticks as f64 / clock_ticks_per_sec());

    Some(UsageSample {
        max_rss_kb,
        cpu_user_secs,
    })
}

/// `utime` is the 14th field of `/proc/<pid>/stat`, but the comm field may
/// contain spaces, so fields are counted after the closing paren.
#[cfg(target_os = "linux")]
fn parse_utime_ticks(stat: &str) -> Option<u64> {
    let after_comm = &stat[stat.rfind(')')? + 1..];
    after_comm
        .split_whitespace()
        .nth(11)
        .and_then(|field| field.parse().ok())
}

#[cfg(target_os = "linux")]
fn clock_ticks_per_sec() -> f64 {
    // SAFETY: sysconf takes no pointers and has no preconditions.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 { ticks as f64 } else { 100.0 }
}

#[cfg(not(target_os = "linux"))]
fn sample_pid(_pid: u32) -> Option<UsageSample> {
    None
}
