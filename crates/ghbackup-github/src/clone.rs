// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shallow clones through the `git` command line.
//!
//! Credentials travel as an `http.extraHeader` supplied through
//! `GIT_CONFIG_*` environment variables, so they never appear in argv or
//! in the remote URL stored in the working copy.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ghbackup_core::paths::working_area;
use ghbackup_core::{BackupError, Cloner, Credentials};
use secrecy::ExposeSecret;
use tokio::process::Command;
use tracing::debug;

/// Default base URL repositories are cloned from.
pub const CLONE_BASE_URL: &str = "https://github.com";

/// [`Cloner`] that shells out to `git clone --depth 1 --single-branch`.
#[derive(Debug, Clone)]
pub struct GitCloner {
    base_url: String,
    program: PathBuf,
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new(CLONE_BASE_URL)
    }
}

impl GitCloner {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            program: PathBuf::from("git"),
        }
    }

    /// Use a different `git` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn remote_url(&self, full_name: &str) -> String {
        format!("{}/{full_name}", self.base_url)
    }
}

fn basic_auth_header(credentials: &Credentials) -> String {
    let raw = format!(
        "{}:{}",
        credentials.username,
        credentials.token.expose_secret()
    );
    format!("Authorization: Basic {}", STANDARD.encode(raw))
}

#[async_trait]
impl Cloner for GitCloner {
    async fn clone_repository(
        &self,
        base_dir: &Path,
        full_name: &str,
        credentials: &Credentials,
    ) -> Result<PathBuf, BackupError> {
        let target = working_area(base_dir, full_name)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BackupError::Clone {
                    repository: full_name.to_string(),
                    message: format!("cannot create `{}`: {e}", parent.display()),
                    source: Some(Box::new(e)),
                })?;
        }

        debug!(repository = full_name, target = %target.display(), "running git clone");
        let output = Command::new(&self.program)
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--single-branch")
            .arg("--quiet")
            .arg(self.remote_url(full_name))
            .arg(&target)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", "http.extraHeader")
            .env("GIT_CONFIG_VALUE_0", basic_auth_header(credentials))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BackupError::Clone {
                repository: full_name.to_string(),
                message: format!("failed to run `{}`: {e}", self.program.display()),
                source: Some(Box::new(e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackupError::clone_failed(
                full_name,
                format!("git exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(target)
    }
}
