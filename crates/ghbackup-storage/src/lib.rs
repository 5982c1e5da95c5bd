// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage side of ghbackup.
//!
//! - [`ZipArchiver`] compresses a working area into one file
//! - [`GcsObjectStore`] uploads archives to Google Cloud Storage
//! - [`BackupDestination`] selects object-store or filesystem persistence
//! - [`retention`] expires old archives on the filesystem destination
//! - [`purge`] clears stale working areas left by interrupted runs

pub mod archive;
pub mod cleanup;
pub mod destination;
pub mod gcs;
pub mod purge;
pub mod retention;

pub use archive::ZipArchiver;
pub use cleanup::remove_path;
pub use destination::BackupDestination;
pub use gcs::GcsObjectStore;
pub use purge::purge_work_dirs;
pub use retention::{RetentionReport, sweep};
