// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for ghbackup.
//!
//! Holds the error taxonomy, the data model shared by discovery, pipeline
//! and metrics, the capability traits every collaborator implements, and
//! the naming rules for working areas and archives.

pub mod error;
pub mod paths;
pub mod traits;
pub mod types;

pub use error::{BackupError, BoxError};
pub use types::{Credentials, Medium, Outcome, RepositoryDescriptor, WorkList};

pub use traits::{
    Archiver, BackupPipeline, Cloner, MetricsSink, ObjectStore, RepositoryLister,
};
pub use traits::metrics::NoopMetrics;
