//! Execution engine for exposing command-line tools over a request/response
//! boundary.
//!
//! A caller hands the engine an [`ExecutionRequest`] (command, input files,
//! requested output files); the engine stages the inputs into an isolated
//! per-request [`Workspace`], runs the command with capped output capture and
//! a wall-clock timeout, collects best-effort resource telemetry, reads the
//! requested outputs back, and returns a single [`ExecutionResult`]. The
//! workspace is removed on every exit path.
//!
//! Network transport, request decoding and authentication are deliberately
//! out of scope; hosts decode their wire format into an `ExecutionRequest`
//! and encode the `ExecutionResult` back out.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod harvester;
pub mod paths;
pub mod runner;
pub mod stager;
pub mod types;
pub mod workspace;

pub use config::EngineConfig;
pub use coordinator::ExecutionCoordinator;
pub use error::{EngineError, EngineResult};
pub use runner::{CapturedStream, ProcessRunner, ResourceMonitor, RunOutcome};
pub use types::{
    ExecutionRequest, ExecutionResult, ExecutionStats, ExecutionStatus, InputFile, OutputFile,
};
pub use workspace::Workspace;
