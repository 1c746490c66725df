//! Orchestration of one execution from staging through teardown

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::harvester::OutputHarvester;
use crate::paths::{normalize_relative, resolve_under_root};
use crate::runner::ProcessRunner;
use crate::stager::FileStager;
use crate::types::{ExecutionRequest, ExecutionResult};
use crate::workspace::Workspace;
use tracing::{debug, instrument};

/// Runs one request end to end inside its own workspace.
///
/// One coordinator serves one inbound request; instances share no mutable
/// state, so any number can run in parallel against the same workspace
/// root. Within an execution the phases are strictly ordered: staging
/// completes before the process spawns, the process terminates (or is
/// killed) before harvesting starts, and harvesting completes before the
/// workspace is removed.
pub struct ExecutionCoordinator {
    config: EngineConfig,
}

impl ExecutionCoordinator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Validate, stage, run and harvest `request`.
    ///
    /// The workspace is removed on every exit path — success, staging
    /// failure, process failure, timeout or harvesting failure; a panic
    /// while executing is covered by the workspace's `Drop` backstop.
    /// Traversal in any input or requested-output path aborts before a
    /// process is spawned.
    #[instrument(skip(self, request), fields(command = %request.command_line()))]
    pub async fn execute(&self, request: &ExecutionRequest) -> EngineResult<ExecutionResult> {
        validate(request)?;

        let workspace = Workspace::create(&self.config.workspace_root).await?;
        let result = self.execute_in(&workspace, request).await;
        workspace.cleanup().await;
        result
    }

    async fn execute_in(
        &self,
        workspace: &Workspace,
        request: &ExecutionRequest,
    ) -> EngineResult<ExecutionResult> {
        let root = workspace.root();

        debug!("staging input files");
        FileStager::stage(root, &request.input_files).await?;

        let cwd = match &request.working_dir {
            Some(dir) => {
                let cwd = resolve_under_root(root, dir)?;
                // The caller may name a cwd its inputs did not create.
                tokio::fs::create_dir_all(&cwd)
                    .await
                    .map_err(|e| EngineError::StagingIo {
                        path: dir.clone(),
                        message: e.to_string(),
                    })?;
                cwd
            }
            None => root.to_path_buf(),
        };

        debug!("running command");
        let runner = ProcessRunner::new(&self.config);
        let outcome = runner.run(&request.command, &cwd).await?;

        debug!(status = ?outcome.status, "harvesting output files");
        let harvested = OutputHarvester::harvest(root, &request.output_files).await?;

        Ok(ExecutionResult {
            status: outcome.status,
            exit_code: outcome.exit_code,
            stdout: outcome.stdout.bytes,
            stderr: outcome.stderr.bytes,
            stdout_truncated: outcome.stdout.truncated,
            stderr_truncated: outcome.stderr.truncated,
            command: request.command_line(),
            output_files: harvested.found,
            missing_files: harvested.missing,
            stats: outcome.stats,
        })
    }
}

/// Request checks that must pass before anything touches the disk.
///
/// Output paths are validated here as well, so a traversal in a requested
/// output rejects the request up front instead of after the command ran.
fn validate(request: &ExecutionRequest) -> EngineResult<()> {
    if request.command.is_empty() {
        return Err(EngineError::EmptyCommand);
    }
    for file in &request.input_files {
        if file.relative_path.is_empty() {
            // Staging skips these.
            continue;
        }
        normalize_relative(&file.relative_path)?;
    }
    for path in &request.output_files {
        normalize_relative(path)?;
    }
    if let Some(dir) = &request.working_dir {
        normalize_relative(dir)?;
    }
    Ok(())
}
