//! Containment checks for caller-supplied relative paths
//!
//! Normalization is purely lexical so paths can be validated before they
//! exist on disk (requested output files are checked up front, long before
//! the command that might create them runs).

use crate::error::{EngineError, EngineResult};
use std::path::{Component, Path, PathBuf};

/// Lexically normalize `relative`, rejecting absolute paths and any `..`
/// component that climbs above its own start.
pub fn normalize_relative(relative: &str) -> EngineResult<PathBuf> {
    let traversal = || EngineError::PathTraversal {
        path: relative.to_string(),
    };

    if relative.is_empty() {
        return Err(traversal());
    }
    let rel = Path::new(relative);
    if rel.is_absolute() {
        return Err(traversal());
    }

    let mut normalized = PathBuf::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(traversal());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(traversal()),
        }
    }
    Ok(normalized)
}

/// Resolve `relative` under `root`; the result is guaranteed to stay inside
/// `root`.
pub fn resolve_under_root(root: &Path, relative: &str) -> EngineResult<PathBuf> {
    Ok(root.join(normalize_relative(relative)?))
}
