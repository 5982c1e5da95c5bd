// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for ghbackup.
//!
//! One flat struct mirrors the environment variables the job is driven by.
//! `#[serde(deny_unknown_fields)]` rejects unrecognized keys in the TOML
//! file so typos surface with a suggestion instead of being ignored.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Raw, unvalidated configuration as merged from defaults, TOML, and env.
///
/// Required values are `Option`s here; [`crate::validation::validate_config`]
/// turns this into a [`crate::RunConfig`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// GitHub user for basic-auth clones (`GITHUB_USER`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub github_user: Option<String>,

    /// GitHub token for listing and cloning (`GITHUB_TOKEN`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub github_token: Option<String>,

    /// Comma separated organization names (`ORG_NAMES`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_names: Option<String>,

    /// Object-store bucket (`BUCKET_NAME`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub bucket_name: Option<String>,

    /// Filesystem destination root (`NFS_SHARE`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub nfs_share: Option<String>,

    /// Archive time-to-live in hours (`TIME_TO_LIVE`).
    #[serde(default)]
    pub time_to_live: Option<f64>,

    /// Maximum number of repositories processed at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Staging directory for clones and archives in object-store mode.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Base path prepended to every object key.
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub object_prefix: String,

    /// Listen address of the metrics endpoint. Empty disables it.
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,

    /// Seconds to keep the metrics endpoint up after the run finishes.
    #[serde(default)]
    pub metrics_linger_secs: u64,

    /// Remove stale `<NFS_SHARE>/<org>` working areas at startup.
    #[serde(default = "default_true")]
    pub purge_work_dirs: bool,

    /// Skip organizations whose discovery fails instead of aborting the run.
    #[serde(default)]
    pub skip_failed_orgs: bool,

    /// GitHub REST API base URL.
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Base URL repositories are cloned from.
    #[serde(default = "default_github_clone_url")]
    pub github_clone_url: String,

    /// Google Cloud Storage JSON API endpoint.
    #[serde(default = "default_gcs_endpoint")]
    pub gcs_endpoint: String,

    /// Static OAuth token for uploads. Falls back to the GCE metadata server.
    #[serde(default, deserialize_with = "lenient_string")]
    pub gcs_token: Option<String>,

    /// Log level for `ghbackup` targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            github_user: None,
            github_token: None,
            org_names: None,
            bucket_name: None,
            nfs_share: None,
            time_to_live: None,
            max_concurrency: default_max_concurrency(),
            work_dir: default_work_dir(),
            object_prefix: String::new(),
            metrics_addr: default_metrics_addr(),
            metrics_linger_secs: 0,
            purge_work_dirs: true,
            skip_failed_orgs: false,
            github_api_url: default_github_api_url(),
            github_clone_url: default_github_clone_url(),
            gcs_endpoint: default_gcs_endpoint(),
            gcs_token: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Every key accepted in the TOML file, used for suggestions.
pub const KNOWN_KEYS: &[&str] = &[
    "github_user",
    "github_token",
    "org_names",
    "bucket_name",
    "nfs_share",
    "time_to_live",
    "max_concurrency",
    "work_dir",
    "object_prefix",
    "metrics_addr",
    "metrics_linger_secs",
    "purge_work_dirs",
    "skip_failed_orgs",
    "github_api_url",
    "github_clone_url",
    "gcs_endpoint",
    "gcs_token",
    "log_level",
    "log_format",
];

fn default_max_concurrency() -> usize {
    10
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("ghbackup")
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

fn default_true() -> bool {
    true
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_clone_url() -> String {
    "https://github.com".to_string()
}

fn default_gcs_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Scalar accepted where a string is expected.
///
/// Figment infers types from environment values, so `ORG_NAMES=1234` or a
/// numeric-looking token arrives as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.map(Scalar::into_string))
}

fn lenient_string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_string(d)?.unwrap_or_default())
}
