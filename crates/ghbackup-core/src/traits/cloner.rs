// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clone capability.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::BackupError;
use crate::types::Credentials;

/// Materializes a repository's default branch below a base directory.
#[async_trait]
pub trait Cloner: Send + Sync {
    /// Clone `full_name` into `base_dir/full_name` and return that path.
    ///
    /// Must reject names that escape `base_dir` before touching the
    /// filesystem.
    async fn clone_repository(
        &self,
        base_dir: &Path,
        full_name: &str,
        credentials: &Credentials,
    ) -> Result<PathBuf, BackupError>;
}
