// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object-store write primitive.

use std::path::Path;

use async_trait::async_trait;

use crate::error::BackupError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream `file` to `<object_base>/<file base name>` in `bucket`.
    ///
    /// Returns the number of bytes written.
    async fn put_file(&self, file: &Path, bucket: &str, object_base: &str)
        -> Result<u64, BackupError>;
}
