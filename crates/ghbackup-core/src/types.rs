// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by discovery, the pipeline, and metrics.

use std::collections::HashSet;
use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

/// An immutable record identifying one repository to back up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// `owner/name`, unique across a run.
    pub full_name: String,
    /// Login of the owning organization, used as the metrics `org` label.
    pub owner_login: String,
}

impl RepositoryDescriptor {
    pub fn new(full_name: impl Into<String>, owner_login: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            owner_login: owner_login.into(),
        }
    }
}

impl fmt::Display for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Destination kind for a backup, rendered as the metrics `medium` label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    /// Durable object store (Google Cloud Storage).
    Gcs,
    /// Shared filesystem with time-based retention.
    Nfs,
}

/// Ordered, append-only list of repositories to back up in one run.
///
/// Working areas are named after full names, so two entries with the same
/// full name would race on the same directory. Duplicates are dropped on
/// append.
#[derive(Debug, Default, Clone)]
pub struct WorkList {
    items: Vec<RepositoryDescriptor>,
    seen: HashSet<String>,
}

impl WorkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor. Returns `false` when its full name is already present.
    pub fn push(&mut self, repository: RepositoryDescriptor) -> bool {
        if !self.seen.insert(repository.full_name.clone()) {
            warn!(repository = %repository.full_name, "duplicate repository in work list, skipping");
            return false;
        }
        self.items.push(repository);
        true
    }

    /// Append every descriptor in discovery order, returning how many were added.
    pub fn extend(&mut self, repositories: impl IntoIterator<Item = RepositoryDescriptor>) -> usize {
        repositories
            .into_iter()
            .map(|repo| self.push(repo))
            .filter(|added| *added)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.items.iter()
    }
}

impl IntoIterator for WorkList {
    type Item = RepositoryDescriptor;
    type IntoIter = std::vec::IntoIter<RepositoryDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<RepositoryDescriptor> for WorkList {
    fn from_iter<I: IntoIterator<Item = RepositoryDescriptor>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

/// Result of attempting one repository, used to drive metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub repository: RepositoryDescriptor,
    pub succeeded: bool,
    pub medium: Medium,
}

/// GitHub credentials used for listing and cloning.
///
/// `Debug` never prints the token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: SecretString::from(token.into()),
        }
    }
}
