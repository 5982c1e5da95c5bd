// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness bundling temporary directories and mock collaborators.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> std::io::Result<()> {
//! use ghbackup_test_utils::TestHarness;
//!
//! let harness = TestHarness::builder().failing_upload("acme_b").build()?;
//! assert!(harness.leftover_files(harness.work_dir()).is_empty());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ghbackup_core::{Credentials, RepositoryDescriptor, WorkList};
use tempfile::TempDir;

use crate::mocks::{MockCloner, MockObjectStore};
use crate::sink::RecordingSink;

/// Builder for [`TestHarness`].
#[derive(Debug, Default)]
pub struct TestHarnessBuilder {
    failing_clones: Vec<String>,
    failing_uploads: Vec<String>,
}

impl TestHarnessBuilder {
    /// Make the mock cloner fail for `full_name`.
    pub fn failing_clone(mut self, full_name: &str) -> Self {
        self.failing_clones.push(full_name.to_string());
        self
    }

    /// Make the mock object store reject files whose name contains `fragment`.
    pub fn failing_upload(mut self, fragment: &str) -> Self {
        self.failing_uploads.push(fragment.to_string());
        self
    }

    pub fn build(self) -> std::io::Result<TestHarness> {
        let root = tempfile::tempdir()?;
        let work_dir = root.path().join("work");
        let nfs_root = root.path().join("nfs");
        std::fs::create_dir_all(&work_dir)?;
        std::fs::create_dir_all(&nfs_root)?;

        let cloner = self
            .failing_clones
            .iter()
            .fold(MockCloner::new(), |c, name| c.failing_for(name));
        let store = self
            .failing_uploads
            .iter()
            .fold(MockObjectStore::new(), |s, frag| s.failing_for(frag));

        Ok(TestHarness {
            _root: root,
            work_dir,
            nfs_root,
            credentials: Credentials::new("octocat", "ghp_test_token"),
            cloner: Arc::new(cloner),
            store: Arc::new(store),
            sink: Arc::new(RecordingSink::default()),
        })
    }
}

/// Temporary directories plus shared mocks for one test.
///
/// Directories are deleted when the harness is dropped.
pub struct TestHarness {
    _root: TempDir,
    work_dir: PathBuf,
    nfs_root: PathBuf,
    pub credentials: Credentials,
    pub cloner: Arc<MockCloner>,
    pub store: Arc<MockObjectStore>,
    pub sink: Arc<RecordingSink>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Staging base for the object-store destination.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Root of the filesystem destination.
    pub fn nfs_root(&self) -> &Path {
        &self.nfs_root
    }

    /// Work list for `organization` with the given repository names.
    pub fn work_list(organization: &str, names: &[&str]) -> WorkList {
        names
            .iter()
            .map(|n| RepositoryDescriptor::new(format!("{organization}/{n}"), organization))
            .collect()
    }

    /// Every entry (file or directory) left below `dir`, sorted.
    pub fn leftover_files(&self, dir: &Path) -> Vec<PathBuf> {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                out.push(path.clone());
                if path.is_dir() {
                    walk(&path, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(dir, &mut out);
        out.sort();
        out
    }
}
