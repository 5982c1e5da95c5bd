// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ghbackup integration tests.
//!
//! Provides in-memory collaborators so the scheduler and pipeline can be
//! exercised without GitHub, `git`, or a real object store.
//!
//! # Components
//!
//! - [`MockLister`] - canned discovery results per organization
//! - [`MockCloner`] - writes a small file tree instead of cloning
//! - [`MockObjectStore`] - records uploads, fails on demand
//! - [`RecordingSink`] - metrics sink with queryable counters
//! - [`CountingPipeline`] - pipeline that tracks how many runs overlap
//! - [`TestHarness`] - temporary directories plus the mocks above

pub mod harness;
pub mod mocks;
pub mod counting;
pub mod sink;

pub use harness::TestHarness;
pub use mocks::{MockCloner, MockLister, MockObjectStore, Upload};
pub use counting::CountingPipeline;
pub use sink::RecordingSink;
