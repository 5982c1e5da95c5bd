// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock discovery, clone, and object-store collaborators.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use ghbackup_core::paths::working_area;
use ghbackup_core::{
    BackupError, Cloner, Credentials, ObjectStore, RepositoryDescriptor, RepositoryLister,
};

/// Lister returning canned repositories (or an error) per organization.
#[derive(Debug, Default)]
pub struct MockLister {
    results: HashMap<String, Result<Vec<RepositoryDescriptor>, String>>,
    calls: Mutex<Vec<String>>,
}

impl MockLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `names` (repository names without owner) for `organization`.
    pub fn with_repos(mut self, organization: &str, names: &[&str]) -> Self {
        let repos = names
            .iter()
            .map(|n| RepositoryDescriptor::new(format!("{organization}/{n}"), organization))
            .collect();
        self.results.insert(organization.to_string(), Ok(repos));
        self
    }

    /// Fail discovery of `organization` with `message`.
    pub fn with_failure(mut self, organization: &str, message: &str) -> Self {
        self.results
            .insert(organization.to_string(), Err(message.to_string()));
        self
    }

    /// Organizations listed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RepositoryLister for MockLister {
    async fn list(&self, organization: &str) -> Result<Vec<RepositoryDescriptor>, BackupError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(organization.to_string());
        }
        match self.results.get(organization) {
            Some(Ok(repos)) => Ok(repos.clone()),
            Some(Err(message)) => Err(BackupError::discovery(organization, message.clone())),
            None => Err(BackupError::discovery(organization, "GitHub returned 404 Not Found")),
        }
    }
}

/// Cloner that writes a small fixed tree instead of running `git`.
///
/// Applies the same working-area validation as the real cloner.
#[derive(Debug, Default)]
pub struct MockCloner {
    failing: HashSet<String>,
    cloned: Mutex<Vec<String>>,
}

impl MockCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make cloning `full_name` fail after its working area was created.
    pub fn failing_for(mut self, full_name: &str) -> Self {
        self.failing.insert(full_name.to_string());
        self
    }

    /// Full names cloned successfully so far.
    pub fn cloned(&self) -> Vec<String> {
        self.cloned.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Cloner for MockCloner {
    async fn clone_repository(
        &self,
        base_dir: &Path,
        full_name: &str,
        _credentials: &Credentials,
    ) -> Result<PathBuf, BackupError> {
        let target = working_area(base_dir, full_name)?;
        let io = |e: std::io::Error| BackupError::Clone {
            repository: full_name.to_string(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        };

        tokio::fs::create_dir_all(target.join("src")).await.map_err(io)?;
        if self.failing.contains(full_name) {
            return Err(BackupError::clone_failed(full_name, "authentication failed"));
        }
        tokio::fs::write(target.join("README.md"), format!("# {full_name}\n"))
            .await
            .map_err(io)?;
        tokio::fs::write(target.join("src/lib.rs"), b"pub fn answer() -> u32 { 42 }\n")
            .await
            .map_err(io)?;

        if let Ok(mut cloned) = self.cloned.lock() {
            cloned.push(full_name.to_string());
        }
        Ok(target)
    }
}

/// One object written to [`MockObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub bucket: String,
    pub key: String,
    pub size: u64,
}

/// Object store that records uploads and fails for selected file names.
#[derive(Debug, Default)]
pub struct MockObjectStore {
    failing: Vec<String>,
    uploads: Mutex<Vec<Upload>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads whose file name contains `fragment`, e.g. `acme_b`.
    pub fn failing_for(mut self, fragment: &str) -> Self {
        self.failing.push(fragment.to_string());
        self
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put_file(
        &self,
        file: &Path,
        bucket: &str,
        object_base: &str,
    ) -> Result<u64, BackupError> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.iter().any(|f| name.contains(f.as_str())) {
            return Err(BackupError::persist(file, "upload rejected: 503 Service Unavailable", None));
        }
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| BackupError::persist(file, e.to_string(), Some(Box::new(e))))?;
        let upload = Upload {
            bucket: bucket.to_string(),
            key: format!("{object_base}/{name}"),
            size: bytes.len() as u64,
        };
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(upload);
        }
        Ok(bytes.len() as u64)
    }
}
