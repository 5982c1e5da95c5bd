// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the backup pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed source error carried by most variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across ghbackup crates.
///
/// Variants mirror where a failure is recovered: `Config` and `Discovery`
/// end the run, `Clone`/`Archive`/`Persist` end one repository, `Cleanup`
/// is only ever logged.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Missing or invalid configuration detected before any work starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// Listing the repositories of an organization failed.
    #[error("discovery failed for organization `{organization}`: {message}")]
    Discovery {
        organization: String,
        message: String,
        source: Option<BoxError>,
    },

    /// Materializing the repository into its working area failed.
    #[error("clone failed for `{repository}`: {message}")]
    Clone {
        repository: String,
        message: String,
        source: Option<BoxError>,
    },

    /// Compressing the working area failed.
    #[error("archive failed for `{}`: {message}", .path.display())]
    Archive {
        path: PathBuf,
        message: String,
        source: Option<BoxError>,
    },

    /// Handing the archive to the backup destination failed.
    #[error("persist failed for `{}`: {message}", .path.display())]
    Persist {
        path: PathBuf,
        message: String,
        source: Option<BoxError>,
    },

    /// Removing a working area or archive failed.
    #[error("cleanup failed for `{}`: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal or unexpected errors (e.g. a panicking worker).
    #[error("internal error: {0}")]
    Internal(String),
}

impl BackupError {
    /// Short, stable label for the failing stage, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Discovery { .. } => "discovery",
            Self::Clone { .. } => "clone",
            Self::Archive { .. } => "archive",
            Self::Persist { .. } => "persist",
            Self::Cleanup { .. } => "cleanup",
            Self::Internal(_) => "internal",
        }
    }

    pub fn discovery(organization: &str, message: impl Into<String>) -> Self {
        Self::Discovery {
            organization: organization.to_string(),
            message: message.into(),
            source: None,
        }
    }

    pub fn clone_failed(repository: &str, message: impl Into<String>) -> Self {
        Self::Clone {
            repository: repository.to_string(),
            message: message.into(),
            source: None,
        }
    }

    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>, source: BoxError) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn persist(path: impl Into<PathBuf>, message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Persist {
            path: path.into(),
            message: message.into(),
            source,
        }
    }
}
