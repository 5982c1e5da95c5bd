// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validated configuration handed to the rest of the program.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ghbackup_core::{Credentials, Medium};
use secrecy::SecretString;

/// The one destination active for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum DestinationConfig {
    /// Upload archives to `bucket` under `prefix/<YYYY/MM/DD>/`.
    ObjectStore { bucket: String, prefix: String },
    /// Keep archives under `root` and expire them after `time_to_live_hours`.
    Filesystem {
        root: PathBuf,
        time_to_live_hours: f64,
    },
}

impl DestinationConfig {
    pub fn medium(&self) -> Medium {
        match self {
            Self::ObjectStore { .. } => Medium::Gcs,
            Self::Filesystem { .. } => Medium::Nfs,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Fully validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: Credentials,
    /// Organizations in configured order, without blanks or duplicates.
    pub organizations: Vec<String>,
    pub destination: DestinationConfig,
    pub max_concurrency: usize,
    pub work_dir: PathBuf,
    /// `None` when the metrics endpoint is disabled.
    pub metrics_addr: Option<SocketAddr>,
    pub metrics_linger: Duration,
    pub purge_work_dirs: bool,
    pub skip_failed_orgs: bool,
    pub github_api_url: String,
    pub github_clone_url: String,
    pub gcs_endpoint: String,
    pub gcs_token: Option<SecretString>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl RunConfig {
    /// Human readable summary with credentials redacted.
    pub fn summary(&self) -> String {
        let destination = match &self.destination {
            DestinationConfig::ObjectStore { bucket, prefix } => {
                format!("gcs bucket `{bucket}` prefix `{prefix}`")
            }
            DestinationConfig::Filesystem {
                root,
                time_to_live_hours,
            } => format!(
                "filesystem `{}` time-to-live {time_to_live_hours}h",
                root.display()
            ),
        };
        let metrics = self
            .metrics_addr
            .map(|a| a.to_string())
            .unwrap_or_else(|| "disabled".to_string());
        format!(
            "github user: {}\n\
             github token: [redacted]\n\
             organizations: {}\n\
             destination: {destination}\n\
             max concurrency: {}\n\
             work dir: {}\n\
             metrics: {metrics}\n\
             purge work dirs: {}\n\
             skip failed orgs: {}",
            self.credentials.username,
            self.organizations.join(", "),
            self.max_concurrency,
            self.work_dir.display(),
            self.purge_work_dirs,
            self.skip_failed_orgs,
        )
    }
}
