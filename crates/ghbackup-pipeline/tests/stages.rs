// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stage chaining and cleanup of `RepositoryPipeline`, using the mock
//! cloner and object store with the real zip archiver.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ghbackup_core::{Archiver, BackupError, BackupPipeline, Medium, RepositoryDescriptor};
use ghbackup_pipeline::RepositoryPipeline;
use ghbackup_storage::{BackupDestination, ZipArchiver};
use ghbackup_test_utils::TestHarness;

fn object_store(harness: &TestHarness) -> BackupDestination {
    BackupDestination::ObjectStore {
        store: harness.store.clone(),
        bucket: "backups".into(),
        prefix: "github".into(),
        work_dir: harness.work_dir().to_path_buf(),
    }
}

fn filesystem(harness: &TestHarness) -> BackupDestination {
    BackupDestination::Filesystem {
        root: harness.nfs_root().to_path_buf(),
        time_to_live_hours: 24.0,
    }
}

fn pipeline(
    harness: &TestHarness,
    archiver: Arc<dyn Archiver>,
    destination: BackupDestination,
) -> RepositoryPipeline {
    RepositoryPipeline::new(
        harness.cloner.clone(),
        archiver,
        destination,
        harness.credentials.clone(),
    )
}

/// Regular files below `dir`. Owner directories are shared between
/// workers and stay in place.
fn files(harness: &TestHarness, dir: &Path) -> Vec<std::path::PathBuf> {
    harness
        .leftover_files(dir)
        .into_iter()
        .filter(|p| p.is_file())
        .collect()
}

fn repo(full_name: &str) -> RepositoryDescriptor {
    let owner = full_name.split('/').next().unwrap_or_default();
    RepositoryDescriptor::new(full_name, owner)
}

/// Zip archiver that remembers how many entries the last archive had.
#[derive(Default)]
struct CountingArchiver {
    entries: AtomicU64,
}

#[async_trait]
impl Archiver for CountingArchiver {
    async fn archive(&self, source: &Path, destination: &Path) -> Result<u64, BackupError> {
        let entries = ZipArchiver.archive(source, destination).await?;
        self.entries.store(entries, Ordering::SeqCst);
        Ok(entries)
    }
}

/// Writes half an archive, then fails.
struct BrokenArchiver;

#[async_trait]
impl Archiver for BrokenArchiver {
    async fn archive(&self, _source: &Path, destination: &Path) -> Result<u64, BackupError> {
        std::fs::write(destination, b"PK\x03\x04trunc").map_err(|e| {
            BackupError::archive(destination, "write failed", Box::new(e))
        })?;
        Err(BackupError::archive(
            destination,
            "disk full",
            "no space left on device".into(),
        ))
    }
}

#[tokio::test]
async fn object_store_success_uploads_and_leaves_nothing_behind() {
    let harness = TestHarness::builder().build().unwrap();
    let pipeline = pipeline(&harness, Arc::new(ZipArchiver), object_store(&harness));

    pipeline.backup(&repo("acme/a")).await.unwrap();

    let uploads = harness.store.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].key.starts_with("github/"), "key: {}", uploads[0].key);
    assert!(uploads[0].key.contains("/ghbackup_acme_a_"), "key: {}", uploads[0].key);
    assert!(uploads[0].size > 0);
    assert!(files(&harness, harness.work_dir()).is_empty());
    assert!(!harness.work_dir().join("acme/a").exists());
    assert_eq!(pipeline.medium(), Medium::Gcs);
}

#[tokio::test]
async fn filesystem_success_keeps_only_the_archive() {
    let harness = TestHarness::builder().build().unwrap();
    let pipeline = pipeline(&harness, Arc::new(ZipArchiver), filesystem(&harness));

    pipeline.backup(&repo("acme/a")).await.unwrap();

    let left = files(&harness, harness.nfs_root());
    assert_eq!(left.len(), 1, "left: {left:?}");
    let name = left[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("ghbackup_acme_a_") && name.ends_with(".zip"));
    assert!(harness.store.uploads().is_empty());
    assert!(!harness.nfs_root().join("acme/a").exists());
    assert_eq!(pipeline.medium(), Medium::Nfs);
}

#[tokio::test]
async fn clone_failure_removes_working_area() {
    let harness = TestHarness::builder().failing_clone("acme/a").build().unwrap();
    let pipeline = pipeline(&harness, Arc::new(ZipArchiver), object_store(&harness));

    let err = pipeline.backup(&repo("acme/a")).await.unwrap_err();

    assert_eq!(err.kind(), "clone");
    assert!(!harness.work_dir().join("acme/a").exists());
}

#[tokio::test]
async fn archive_failure_removes_working_area_and_partial_archive() {
    let harness = TestHarness::builder().build().unwrap();
    let pipeline = pipeline(&harness, Arc::new(BrokenArchiver), object_store(&harness));

    let err = pipeline.backup(&repo("acme/a")).await.unwrap_err();

    assert_eq!(err.kind(), "archive");
    let leftovers = files(&harness, harness.work_dir());
    assert!(leftovers.is_empty(), "left: {leftovers:?}");
    assert!(!harness.work_dir().join("acme/a").exists());
}

#[tokio::test]
async fn persist_failure_removes_working_area_and_archive() {
    let harness = TestHarness::builder().failing_upload("acme_b").build().unwrap();
    let pipeline = pipeline(&harness, Arc::new(ZipArchiver), object_store(&harness));

    let err = pipeline.backup(&repo("acme/b")).await.unwrap_err();

    assert_eq!(err.kind(), "persist");
    assert!(harness.store.uploads().is_empty());
    let left = files(&harness, harness.work_dir());
    assert!(left.is_empty(), "left: {left:?}");
    assert!(!harness.work_dir().join("acme/b").exists());
}

#[tokio::test]
async fn traversal_is_rejected_before_touching_disk() {
    let harness = TestHarness::builder().build().unwrap();
    let pipeline = pipeline(&harness, Arc::new(ZipArchiver), object_store(&harness));

    let err = pipeline.backup(&repo("acme/../../etc")).await.unwrap_err();

    assert_eq!(err.kind(), "clone");
    assert!(harness.cloner.cloned().is_empty());
    assert!(harness.leftover_files(harness.work_dir()).is_empty());
}

#[tokio::test]
async fn stale_working_area_is_cleared_before_clone() {
    let harness = TestHarness::builder().build().unwrap();
    let stale = harness.work_dir().join("acme/a");
    std::fs::create_dir_all(&stale).unwrap();
    std::fs::write(stale.join("leftover.txt"), "from an interrupted run").unwrap();

    let archiver = Arc::new(CountingArchiver::default());
    let pipeline = pipeline(&harness, archiver.clone(), object_store(&harness));
    pipeline.backup(&repo("acme/a")).await.unwrap();

    // The mock clone writes README.md and src/lib.rs.
    assert_eq!(archiver.entries.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn repeated_backups_of_same_repository_do_not_interfere() {
    let harness = TestHarness::builder().build().unwrap();
    let pipeline = pipeline(&harness, Arc::new(ZipArchiver), object_store(&harness));

    pipeline.backup(&repo("acme/a")).await.unwrap();
    pipeline.backup(&repo("acme/a")).await.unwrap();

    assert_eq!(harness.store.uploads().len(), 2);
    assert!(files(&harness, harness.work_dir()).is_empty());
}
