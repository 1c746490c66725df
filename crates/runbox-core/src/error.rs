//! Error types for the execution engine

use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that abort an execution before a process is spawned.
///
/// Process-level outcomes (a command that cannot be launched, a timeout, a
/// non-zero exit, missing output files) are deliberately not errors; they
/// are reported through [`crate::types::ExecutionResult`] so the caller
/// always receives a structured answer for ordinary command failures.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The request carried an empty command vector
    #[error("command must not be empty")]
    EmptyCommand,

    /// A caller-supplied relative path resolves outside the workspace root
    #[error("path escapes the workspace root: {path}")]
    PathTraversal { path: String },

    /// Filesystem failure while writing input files into the workspace
    #[error("failed to stage {path}: {message}")]
    StagingIo { path: String, message: String },

    /// The workspace directory could not be created
    #[error("workspace setup failed: {0}")]
    WorkspaceSetup(String),

    /// Unexpected internal fault
    #[error("engine internal error: {0}")]
    Internal(String),
}
