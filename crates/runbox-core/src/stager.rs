//! Staging of caller-supplied input files into a workspace

use crate::error::{EngineError, EngineResult};
use crate::paths::resolve_under_root;
use crate::types::InputFile;
use std::path::Path;
use tracing::debug;

/// Writes a request's input files under a workspace root.
pub struct FileStager;

impl FileStager {
    /// Materialize `files` under `root`, creating parent directories as
    /// needed and preserving each file's relative path.
    ///
    /// A path that escapes the root fails the whole pass; partial writes
    /// are not recoverable and the caller is expected to tear the workspace
    /// down. An entry with an empty relative path is skipped.
    pub async fn stage(root: &Path, files: &[InputFile]) -> EngineResult<()> {
        for file in files {
            if file.relative_path.is_empty() {
                debug!("skipping input file with empty relative path");
                continue;
            }

            let target = resolve_under_root(root, &file.relative_path)?;
            let staging_err = |e: std::io::Error| EngineError::StagingIo {
                path: file.relative_path.clone(),
                message: e.to_string(),
            };

            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(staging_err)?;
            }
            tokio::fs::write(&target, &file.content)
                .await
                .map_err(staging_err)?;
            debug!(
                path = %file.relative_path,
                bytes = file.content.len(),
                "staged input file"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(path: &str, content: &str) -> InputFile {
        InputFile {
            relative_path: path.to_string(),
            content: content.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn stages_files_with_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        FileStager::stage(
            root.path(),
            &[
                input("hello.txt", "Hello World!"),
                input("test/nested/another.txt", "nested content"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(root.path().join("hello.txt")).unwrap(),
            "Hello World!"
        );
        assert_eq!(
            std::fs::read_to_string(root.path().join("test/nested/another.txt")).unwrap(),
            "nested content"
        );
    }

    #[tokio::test]
    async fn traversal_fails_the_whole_pass() {
        let root = tempfile::tempdir().unwrap();
        let result = FileStager::stage(
            root.path(),
            &[input("ok.txt", "fine"), input("../escape.txt", "nope")],
        )
        .await;

        assert!(matches!(result, Err(EngineError::PathTraversal { .. })));
        assert!(!root.path().parent().unwrap().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn empty_relative_path_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        FileStager::stage(root.path(), &[input("", "ignored"), input("kept.txt", "x")])
            .await
            .unwrap();
        assert!(root.path().join("kept.txt").exists());
    }
}
