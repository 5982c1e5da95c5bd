// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline stand-in that measures scheduler concurrency.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ghbackup_core::{BackupError, BackupPipeline, Medium, RepositoryDescriptor};

/// Holds each repository for `hold`, tracking current and peak overlap.
#[derive(Debug)]
pub struct CountingPipeline {
    hold: Duration,
    medium: Medium,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    active: AtomicUsize,
    peak: AtomicUsize,
    started: Mutex<Vec<String>>,
}

impl CountingPipeline {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            medium: Medium::Gcs,
            failing: HashSet::new(),
            panicking: HashSet::new(),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn with_medium(mut self, medium: Medium) -> Self {
        self.medium = medium;
        self
    }

    /// Return an error for `full_name`.
    pub fn failing_for(mut self, full_name: &str) -> Self {
        self.failing.insert(full_name.to_string());
        self
    }

    /// Panic while processing `full_name`.
    pub fn panicking_for(mut self, full_name: &str) -> Self {
        self.panicking.insert(full_name.to_string());
        self
    }

    /// Highest number of simultaneously running backups observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Backups running right now.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Full names in the order their backups started.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BackupPipeline for CountingPipeline {
    async fn backup(&self, repository: &RepositoryDescriptor) -> Result<(), BackupError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Ok(mut started) = self.started.lock() {
            started.push(repository.full_name.clone());
        }

        tokio::time::sleep(self.hold).await;

        if self.panicking.contains(&repository.full_name) {
            panic!("injected panic for {}", repository.full_name);
        }
        if self.failing.contains(&repository.full_name) {
            return Err(BackupError::clone_failed(&repository.full_name, "injected failure"));
        }
        Ok(())
    }

    fn medium(&self) -> Medium {
        self.medium
    }
}
