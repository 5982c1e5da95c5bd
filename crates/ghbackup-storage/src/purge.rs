// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup purge of stale working areas on the filesystem destination.
//!
//! Working areas live in `<root>/<org>/<repo>` while archives sit directly
//! in `<root>`, so removing the per-organization directories reclaims what
//! an interrupted run left behind without touching any archive.

use std::path::Path;

use ghbackup_core::paths::validate_relative_name;
use tracing::{debug, info, warn};

use crate::cleanup::remove_path;

/// Remove `<root>/<org>` for every organization. Returns how many were removed.
///
/// GitHub logins are case-insensitive and working areas are named after
/// the discovered owner login, so directory names are matched ignoring
/// ASCII case. Names that are not a single plain path segment are refused.
/// Files named like an organization are left alone; only directories are
/// purged.
pub async fn purge_work_dirs(root: &Path, organizations: &[String]) -> usize {
    let wanted: Vec<&str> = organizations
        .iter()
        .filter(|org| {
            let plain = !org.contains('/') && validate_relative_name(org).is_ok();
            if !plain {
                warn!(organization = %org, "refusing to purge suspicious organization directory");
            }
            plain
        })
        .map(String::as_str)
        .collect();
    if wanted.is_empty() {
        return 0;
    }

    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(root = %root.display(), error = %e, "nothing to purge");
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "cannot list destination root");
                break;
            }
        };
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !wanted.iter().any(|org| org.eq_ignore_ascii_case(name)) {
            continue;
        }

        let dir = entry.path();
        match tokio::fs::symlink_metadata(&dir).await {
            Ok(m) if m.is_dir() => {}
            Ok(_) => {
                warn!(path = %dir.display(), "not a directory, skipping purge");
                continue;
            }
            Err(_) => continue,
        }
        match remove_path(&dir).await {
            Ok(true) => {
                info!(path = %dir.display(), "purged stale working areas");
                removed += 1;
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to purge working areas"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_org_directories_but_keeps_archives() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("acme/a/src")).unwrap();
        std::fs::write(root.path().join("acme/a/src/lib.rs"), "x").unwrap();
        let archive = root.path().join("ghbackup_acme_a_2024_01_01_00_00.zip");
        std::fs::write(&archive, "PK").unwrap();

        let removed =
            purge_work_dirs(root.path(), &["acme".to_string(), "globex".to_string()]).await;

        assert_eq!(removed, 1);
        assert!(!root.path().join("acme").exists());
        assert!(archive.exists());
    }

    #[tokio::test]
    async fn refuses_traversal_names() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("nfs");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(parent.path().join("precious")).unwrap();

        let removed = purge_work_dirs(&root, &["../precious".to_string(), "..".to_string()]).await;

        assert_eq!(removed, 0);
        assert!(parent.path().join("precious").is_dir());
    }

    #[tokio::test]
    async fn matches_organization_directories_ignoring_case() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("kartverket/kart/src")).unwrap();
        std::fs::create_dir_all(root.path().join("other/repo")).unwrap();

        let removed = purge_work_dirs(root.path(), &["Kartverket".to_string()]).await;

        assert_eq!(removed, 1);
        assert!(!root.path().join("kartverket").exists());
        assert!(root.path().join("other/repo").is_dir());
    }

    #[tokio::test]
    async fn missing_root_purges_nothing() {
        let parent = tempfile::tempdir().unwrap();
        let removed = purge_work_dirs(&parent.path().join("absent"), &["acme".to_string()]).await;
        assert_eq!(removed, 0);
    }
}
