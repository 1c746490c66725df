//! Harvesting of requested output files from a workspace

use crate::error::EngineResult;
use crate::paths::resolve_under_root;
use crate::types::OutputFile;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of reading back the requested output paths.
///
/// Every requested path lands in exactly one of `found` or `missing`, both
/// in the caller's requested order.
#[derive(Debug, Default)]
pub struct HarvestedOutputs {
    pub found: Vec<OutputFile>,
    pub missing: Vec<String>,
}

/// Reads requested output files back out of a workspace after execution.
pub struct OutputHarvester;

impl OutputHarvester {
    /// Read each path in `requested` relative to `root`, in order.
    ///
    /// A path that does not exist is recorded in `missing` — partial output
    /// retrieval is expected and normal. Read failures other than
    /// not-found are logged and also recorded as missing. Only traversal
    /// is an error.
    pub async fn harvest(root: &Path, requested: &[String]) -> EngineResult<HarvestedOutputs> {
        let mut outputs = HarvestedOutputs::default();
        for path in requested {
            let target = resolve_under_root(root, path)?;
            match tokio::fs::read(&target).await {
                Ok(content) => {
                    debug!(path = %path, bytes = content.len(), "harvested output file");
                    outputs.found.push(OutputFile {
                        relative_path: path.clone(),
                        content,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path, "requested output file not found");
                    outputs.missing.push(path.clone());
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to read requested output file");
                    outputs.missing.push(path.clone());
                }
            }
        }
        Ok(outputs)
    }
}
