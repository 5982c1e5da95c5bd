// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic naming for working areas, archive files, and object keys.
//!
//! All of these are derived from a repository's full name, which is unique
//! within a run. That uniqueness is what keeps concurrent workers from
//! sharing a path.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::BackupError;

/// Prefix of every archive file name.
pub const ARCHIVE_PREFIX: &str = "ghbackup";

/// Extension of every archive file name.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Resolve the working area of `full_name` below `base`.
///
/// Rejects names that could escape `base`: any `..` sequence, absolute
/// paths, empty segments, and `.` segments. Purely lexical, so it never
/// touches the filesystem.
pub fn working_area(base: &Path, full_name: &str) -> Result<PathBuf, BackupError> {
    validate_relative_name(full_name)
        .map_err(|reason| BackupError::clone_failed(full_name, reason))?;
    Ok(base.join(full_name))
}

/// Lexical check shared by working areas and the startup purge.
///
/// Returns a human readable reason on rejection.
pub fn validate_relative_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty name".to_string());
    }
    if name.contains("..") {
        return Err(format!("`{name}` contains a parent-directory sequence"));
    }
    if name.contains('\\') {
        return Err(format!("`{name}` contains a backslash"));
    }
    if name.split('/').any(str::is_empty) {
        return Err(format!("`{name}` contains an empty path segment"));
    }
    let all_normal = Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !all_normal {
        return Err(format!("`{name}` is not a plain relative path"));
    }
    Ok(())
}

/// `ghbackup_<owner>_<name>_<YYYY_MM_DD_HH_MM>.zip`, minute resolution.
pub fn archive_file_name(full_name: &str, now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y_%m_%d_%H_%M");
    let flat = full_name.replace('/', "_");
    format!("{ARCHIVE_PREFIX}_{flat}_{stamp}.{ARCHIVE_EXTENSION}")
}

/// Object base path `<prefix>/<YYYY/MM/DD>` for archives persisted at `now`.
///
/// Leading and trailing slashes on `prefix` are ignored; an empty prefix
/// yields just the date.
pub fn object_base(prefix: &str, now: DateTime<Utc>) -> String {
    let date = now.format("%Y/%m/%d");
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        date.to_string()
    } else {
        format!("{prefix}/{date}")
    }
}

/// Full object key `<object_base>/<file_name>`.
pub fn object_key(object_base: &str, file_name: &str) -> String {
    let base = object_base.trim_matches('/');
    if base.is_empty() {
        file_name.to_string()
    } else {
        format!("{base}/{file_name}")
    }
}
