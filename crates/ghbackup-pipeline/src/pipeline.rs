// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clone, archive, persist and cleanup for a single repository.
//!
//! Each stage consumes the previous stage's output. A failing stage stops
//! the chain, removes whatever the earlier stages left on disk, and returns
//! its own error; cleanup problems are logged and never replace it.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ghbackup_core::paths::working_area;
use ghbackup_core::{
    Archiver, BackupError, BackupPipeline, Cloner, Credentials, Medium, RepositoryDescriptor,
};
use ghbackup_storage::{BackupDestination, remove_path};
use tracing::{debug, info, warn};

use crate::stage::StepKind;

/// Production [`BackupPipeline`] composed from injected collaborators.
pub struct RepositoryPipeline {
    cloner: Arc<dyn Cloner>,
    archiver: Arc<dyn Archiver>,
    destination: BackupDestination,
    credentials: Credentials,
}

impl std::fmt::Debug for RepositoryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryPipeline")
            .field("destination", &self.destination)
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

impl RepositoryPipeline {
    pub fn new(
        cloner: Arc<dyn Cloner>,
        archiver: Arc<dyn Archiver>,
        destination: BackupDestination,
        credentials: Credentials,
    ) -> Self {
        Self {
            cloner,
            archiver,
            destination,
            credentials,
        }
    }

    pub fn destination(&self) -> &BackupDestination {
        &self.destination
    }

    /// Remove `path`, logging instead of failing.
    async fn discard(&self, repository: &str, path: &Path) {
        match remove_path(path).await {
            Ok(true) => debug!(repository, path = %path.display(), step = %StepKind::Cleanup, "removed"),
            Ok(false) => {}
            Err(e) => warn!(
                repository,
                path = %path.display(),
                step = %StepKind::Cleanup,
                error = %e,
                "cleanup failed"
            ),
        }
    }

    fn failed(repository: &str, step: StepKind, error: &BackupError) {
        warn!(repository, step = %step, error = %error, "step failed");
    }
}

#[async_trait]
impl BackupPipeline for RepositoryPipeline {
    async fn backup(&self, repository: &RepositoryDescriptor) -> Result<(), BackupError> {
        let name = repository.full_name.as_str();
        let base = self.destination.work_base();
        let started = Instant::now();

        // Rejects traversal before anything touches the filesystem.
        let area = working_area(base, name)?;
        // Leftovers of an interrupted run would end up in the archive.
        self.discard(name, &area).await;

        debug!(repository = name, step = %StepKind::Clone, "starting");
        let area = match self.cloner.clone_repository(base, name, &self.credentials).await {
            Ok(path) => path,
            Err(e) => {
                Self::failed(name, StepKind::Clone, &e);
                self.discard(name, &area).await;
                return Err(e);
            }
        };

        let archive = self.destination.archive_path(name);
        debug!(repository = name, step = %StepKind::Archive, archive = %archive.display(), "starting");
        if let Err(e) = self.archiver.archive(&area, &archive).await {
            Self::failed(name, StepKind::Archive, &e);
            self.discard(name, &area).await;
            self.discard(name, &archive).await;
            return Err(e);
        }

        debug!(repository = name, step = %StepKind::Persist, "starting");
        if let Err(e) = self.destination.persist(&archive).await {
            Self::failed(name, StepKind::Persist, &e);
            self.discard(name, &area).await;
            self.discard(name, &archive).await;
            return Err(e);
        }

        self.discard(name, &area).await;
        if !self.destination.retains_archive() {
            self.discard(name, &archive).await;
        }

        info!(
            repository = name,
            medium = %self.destination.medium(),
            elapsed_ms = elapsed_millis(started.elapsed()),
            "backup complete"
        );
        Ok(())
    }

    fn medium(&self) -> Medium {
        self.destination.medium()
    }
}

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`.
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
