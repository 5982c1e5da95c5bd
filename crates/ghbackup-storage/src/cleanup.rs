// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent removal of working areas and archive files.

use std::io::ErrorKind;
use std::path::Path;

use ghbackup_core::BackupError;

/// Remove a file or directory tree.
///
/// Returns `Ok(false)` when `path` was already absent, so a second call on
/// the same path is never an error.
pub async fn remove_path(path: &Path) -> Result<bool, BackupError> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(BackupError::Cleanup {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let result = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BackupError::Cleanup {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_directory_tree_then_reports_absent() {
        let dir = tempfile::tempdir().unwrap();
        let area = dir.path().join("acme/a");
        std::fs::create_dir_all(area.join("src")).unwrap();
        std::fs::write(area.join("src/lib.rs"), "x").unwrap();

        assert!(remove_path(&area).await.unwrap());
        assert!(!area.exists());
        assert!(!remove_path(&area).await.unwrap());
    }

    #[tokio::test]
    async fn removes_single_file_twice_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        std::fs::write(&archive, "PK").unwrap();

        assert!(remove_path(&archive).await.unwrap());
        assert!(!remove_path(&archive).await.unwrap());
    }
}
