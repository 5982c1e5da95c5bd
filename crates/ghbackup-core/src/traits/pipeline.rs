// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-repository pipeline as seen by the scheduler.

use async_trait::async_trait;

use crate::error::BackupError;
use crate::types::{Medium, RepositoryDescriptor};

/// Runs clone, archive, persist and cleanup for one repository.
///
/// Implementations clean up their own working area and archive before
/// returning, whatever the result.
#[async_trait]
pub trait BackupPipeline: Send + Sync {
    async fn backup(&self, repository: &RepositoryDescriptor) -> Result<(), BackupError>;

    /// Medium label reported with every outcome of this pipeline.
    fn medium(&self) -> Medium;
}
