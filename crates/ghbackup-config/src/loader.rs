// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. TOML file (`--config <path>`, else `./ghbackup.toml` when present)
//! 3. The job's plain environment variables (`GITHUB_USER`, `ORG_NAMES`, ...)
//! 4. `GHBACKUP_*` environment variables for the tuning knobs

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BackupConfig;

/// File read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ghbackup.toml";

/// Unprefixed variables the job has always been configured with.
pub const PLAIN_ENV_VARS: &[&str] = &[
    "GITHUB_USER",
    "GITHUB_TOKEN",
    "ORG_NAMES",
    "BUCKET_NAME",
    "NFS_SHARE",
    "TIME_TO_LIVE",
];

/// Load configuration from `path` (or the default file) plus the environment.
pub fn load_config(path: Option<&Path>) -> Result<BackupConfig, figment::Error> {
    build_figment(path).extract()
}

/// Load configuration from a TOML string only, without the environment.
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BackupConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BackupConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment(path: Option<&Path>) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BackupConfig::default()))
        .merge(Toml::file(config_path(path)))
        .merge(plain_env_provider())
        .merge(prefixed_env_provider())
}

/// Resolve the TOML file that will be read.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// `GITHUB_USER` -> `github_user` and so on, ignoring every other variable.
fn plain_env_provider() -> Env {
    Env::raw().only(PLAIN_ENV_VARS)
}

/// `GHBACKUP_MAX_CONCURRENCY` -> `max_concurrency`.
///
/// Field names are flat, so no `split` or `map` is needed.
fn prefixed_env_provider() -> Env {
    Env::prefixed("GHBACKUP_")
}
