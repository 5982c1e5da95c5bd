// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The backup destination active for a run.
//!
//! Exactly one variant is selected at startup and shared read-only by every
//! worker, so a run never mixes destinations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use ghbackup_core::paths::{archive_file_name, object_base};
use ghbackup_core::{BackupError, Medium, ObjectStore};
use tracing::debug;

/// Where archives end up.
#[derive(Clone)]
pub enum BackupDestination {
    /// Archives are staged in `work_dir` and uploaded to `bucket`.
    ObjectStore {
        store: Arc<dyn ObjectStore>,
        bucket: String,
        prefix: String,
        work_dir: PathBuf,
    },
    /// Archives are written directly under `root` and kept until they expire.
    Filesystem { root: PathBuf, time_to_live_hours: f64 },
}

impl std::fmt::Debug for BackupDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ObjectStore {
                bucket,
                prefix,
                work_dir,
                ..
            } => f
                .debug_struct("ObjectStore")
                .field("bucket", bucket)
                .field("prefix", prefix)
                .field("work_dir", work_dir)
                .finish_non_exhaustive(),
            Self::Filesystem {
                root,
                time_to_live_hours,
            } => f
                .debug_struct("Filesystem")
                .field("root", root)
                .field("time_to_live_hours", time_to_live_hours)
                .finish(),
        }
    }
}

impl BackupDestination {
    pub fn medium(&self) -> Medium {
        match self {
            Self::ObjectStore { .. } => Medium::Gcs,
            Self::Filesystem { .. } => Medium::Nfs,
        }
    }

    /// Base directory for working areas and archive files.
    pub fn work_base(&self) -> &Path {
        match self {
            Self::ObjectStore { work_dir, .. } => work_dir,
            Self::Filesystem { root, .. } => root,
        }
    }

    /// Archive path for `full_name`, stamped with the current minute.
    pub fn archive_path(&self, full_name: &str) -> PathBuf {
        self.work_base()
            .join(archive_file_name(full_name, Utc::now()))
    }

    /// Whether the local archive is the durable copy and must be kept.
    pub fn retains_archive(&self) -> bool {
        matches!(self, Self::Filesystem { .. })
    }

    /// Hand `archive` to the destination.
    ///
    /// Object store: upload under `<prefix>/<YYYY/MM/DD>/`, dated now.
    /// Filesystem: the archive is already in place; confirm it is readable.
    pub async fn persist(&self, archive: &Path) -> Result<(), BackupError> {
        match self {
            Self::ObjectStore {
                store,
                bucket,
                prefix,
                ..
            } => {
                let base = object_base(prefix, Utc::now());
                let bytes = store.put_file(archive, bucket, &base).await?;
                debug!(archive = %archive.display(), bucket, bytes, "archive uploaded");
                Ok(())
            }
            Self::Filesystem { .. } => {
                let file = tokio::fs::File::open(archive).await.map_err(|e| {
                    BackupError::persist(archive, "archive is not readable", Some(Box::new(e)))
                })?;
                let metadata = file.metadata().await.map_err(|e| {
                    BackupError::persist(archive, "cannot stat archive", Some(Box::new(e)))
                })?;
                if !metadata.is_file() {
                    return Err(BackupError::persist(archive, "archive is not a regular file", None));
                }
                Ok(())
            }
        }
    }
}
