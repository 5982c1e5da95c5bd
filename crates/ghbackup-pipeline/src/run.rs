// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One complete backup run.
//!
//! Discovery runs sequentially per organization and builds the work list.
//! In filesystem mode the stale working areas are purged and the retention
//! sweep runs next. Only then is the scheduler started.

use std::sync::Arc;

use ghbackup_core::{BackupError, BackupPipeline, MetricsSink, Outcome, RepositoryLister, WorkList};
use ghbackup_storage::{BackupDestination, RetentionReport, purge_work_dirs, sweep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::scheduler::{DEFAULT_MAX_CONCURRENCY, Scheduler};

/// Behaviour switches for a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_concurrency: usize,
    /// Remove `<root>/<org>` working directories before a filesystem run.
    pub purge_work_dirs: bool,
    /// Log and skip organizations whose discovery fails instead of aborting.
    pub skip_failed_orgs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            purge_work_dirs: true,
            skip_failed_orgs: false,
        }
    }
}

/// What a finished run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub discovered: usize,
    pub skipped_organizations: Vec<String>,
    pub purged_directories: usize,
    pub retention: Option<RetentionReport>,
    pub outcomes: Vec<Outcome>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Wires discovery, destination housekeeping, and the scheduler together.
pub struct BackupRun {
    lister: Arc<dyn RepositoryLister>,
    pipeline: Arc<dyn BackupPipeline>,
    metrics: Arc<dyn MetricsSink>,
    destination: BackupDestination,
    organizations: Vec<String>,
    options: RunOptions,
    shutdown: CancellationToken,
}

impl BackupRun {
    pub fn new(
        lister: Arc<dyn RepositoryLister>,
        pipeline: Arc<dyn BackupPipeline>,
        metrics: Arc<dyn MetricsSink>,
        destination: BackupDestination,
        organizations: Vec<String>,
    ) -> Self {
        Self {
            lister,
            pipeline,
            metrics,
            destination,
            organizations,
            options: RunOptions::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Execute the run.
    ///
    /// Fails only when discovery fails and `skip_failed_orgs` is off.
    /// Per-repository failures are reported through the outcomes.
    pub async fn execute(&self) -> Result<RunSummary, BackupError> {
        let mut summary = RunSummary::default();

        let work = self.discover(&mut summary.skipped_organizations).await?;
        summary.discovered = work.len();

        if let BackupDestination::Filesystem {
            root,
            time_to_live_hours,
        } = &self.destination
        {
            if self.options.purge_work_dirs {
                summary.purged_directories = purge_work_dirs(root, &self.organizations).await;
            } else {
                info!(root = %root.display(), "startup purge of working directories disabled");
            }

            let root = root.clone();
            let ttl = *time_to_live_hours;
            let report = tokio::task::spawn_blocking(move || sweep(&root, ttl))
                .await
                .map_err(|e| BackupError::Internal(format!("retention sweep task failed: {e}")))?;
            summary.retention = Some(report);
        }

        summary.outcomes = Scheduler::new(
            Arc::clone(&self.pipeline),
            Arc::clone(&self.metrics),
            self.options.max_concurrency,
        )
        .with_shutdown(self.shutdown.clone())
        .run(work)
        .await;

        Ok(summary)
    }

    async fn discover(&self, skipped: &mut Vec<String>) -> Result<WorkList, BackupError> {
        let mut work = WorkList::new();
        for organization in &self.organizations {
            if self.shutdown.is_cancelled() {
                warn!(organization, "shutdown requested, skipping discovery");
                skipped.push(organization.clone());
                continue;
            }
            match self.lister.list(organization).await {
                Ok(repositories) => {
                    let found = repositories.len();
                    let added = work.extend(repositories);
                    info!(organization, found, added, "discovered repositories");
                }
                Err(e) if self.options.skip_failed_orgs => {
                    warn!(organization, error = %e, "discovery failed, skipping organization");
                    skipped.push(organization.clone());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(work)
    }
}
