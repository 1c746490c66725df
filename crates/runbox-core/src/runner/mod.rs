//! Process execution and resource accounting

mod monitor;
mod runner;

#[cfg(test)]
mod tests;

pub use monitor::{ResourceMonitor, UsageSample};
pub use runner::{CapturedStream, ProcessRunner, RunOutcome};
