// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup pipeline and scheduling for ghbackup.
//!
//! - [`RepositoryPipeline`] runs clone, archive, persist, cleanup for one
//!   repository and owns the cleanup discipline between stages.
//! - [`Scheduler`] fans a work list out over a pipeline with a fixed
//!   concurrency ceiling and records one outcome per repository.
//! - [`BackupRun`] sequences discovery, destination housekeeping and the
//!   scheduler.

pub mod pipeline;
pub mod run;
pub mod scheduler;
pub mod stage;

pub use pipeline::RepositoryPipeline;
pub use run::{BackupRun, RunOptions, RunSummary};
pub use scheduler::{DEFAULT_MAX_CONCURRENCY, Scheduler};
pub use stage::StepKind;
