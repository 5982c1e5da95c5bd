// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive capability.

use std::path::Path;

use async_trait::async_trait;

use crate::error::BackupError;

/// Compresses a directory tree into a single file.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Write an archive of every regular file under `source` to `destination`,
    /// returning the number of entries stored.
    async fn archive(&self, source: &Path, destination: &Path) -> Result<u64, BackupError>;
}
