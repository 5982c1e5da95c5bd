// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits injected into the pipeline and scheduler.
//!
//! Every collaborator is a `Send + Sync` trait object so the scheduler can
//! share one instance across concurrent workers. Async traits use
//! `#[async_trait]` for dynamic dispatch.

pub mod archiver;
pub mod cloner;
pub mod lister;
pub mod metrics;
pub mod object_store;
pub mod pipeline;

pub use archiver::Archiver;
pub use cloner::Cloner;
pub use lister::RepositoryLister;
pub use metrics::MetricsSink;
pub use object_store::ObjectStore;
pub use pipeline::BackupPipeline;
