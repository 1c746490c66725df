//! Per-execution isolated directories

use crate::error::{EngineError, EngineResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// An exclusively-owned scratch directory for a single execution.
///
/// Directory names carry a UUIDv4, so concurrent creations under the same
/// base need no coordination to stay distinct. The tree is removed by
/// [`Workspace::cleanup`]; dropping a workspace that was never cleaned up
/// removes it as a backstop, so no tree outlives its coordinator even when
/// an execution panics. Removal is idempotent and removal failures are
/// logged rather than propagated; they never mask the execution's outcome.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Create a uniquely named workspace under `base`, creating `base`
    /// itself if needed.
    pub async fn create(base: &Path) -> EngineResult<Self> {
        let root = base.join(format!("exec-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| EngineError::WorkspaceSetup(format!("{}: {}", root.display(), e)))?;
        debug!(root = %root.display(), "workspace created");
        Ok(Self {
            root,
            removed: false,
        })
    }

    /// The workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the workspace tree.
    pub async fn cleanup(mut self) {
        self.removed = true;
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => debug!(root = %self.root.display(), "workspace removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "failed to remove workspace")
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(root = %self.root.display(), error = %e, "failed to remove workspace on drop");
            }
        }
    }
}
