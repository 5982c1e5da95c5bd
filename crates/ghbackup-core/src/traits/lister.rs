// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery capability.

use async_trait::async_trait;

use crate::error::BackupError;
use crate::types::RepositoryDescriptor;

/// Lists every repository of one organization.
///
/// Implementations follow pagination to the end and return either the full
/// list or a `BackupError::Discovery`, never a partial result.
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    async fn list(&self, organization: &str) -> Result<Vec<RepositoryDescriptor>, BackupError>;
}
