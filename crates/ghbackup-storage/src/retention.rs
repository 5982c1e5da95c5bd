// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-based retention for the filesystem destination.
//!
//! Every regular file under the root whose age in hours exceeds the
//! time-to-live is deleted. Individual failures are logged and never stop
//! the sweep; files that disappear mid-sweep are not failures.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Totals of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetentionReport {
    /// Files younger than the time-to-live.
    pub retained: usize,
    /// Expired files deleted by this sweep.
    pub removed: usize,
    /// Files that could not be inspected or deleted.
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Retained,
    Removed,
    Vanished,
    Failed,
}

/// Sweep `root` against the current wall-clock time.
pub fn sweep(root: &Path, time_to_live_hours: f64) -> RetentionReport {
    sweep_at(root, time_to_live_hours, SystemTime::now())
}

/// Sweep `root`, computing ages relative to `now`.
pub fn sweep_at(root: &Path, time_to_live_hours: f64, now: SystemTime) -> RetentionReport {
    let mut report = RetentionReport::default();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let vanished = e
                    .io_error()
                    .is_some_and(|io| io.kind() == ErrorKind::NotFound);
                if vanished {
                    debug!(error = %e, "entry vanished during retention sweep");
                } else {
                    warn!(error = %e, "cannot access entry during retention sweep");
                    report.failed += 1;
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match examine(entry.path(), time_to_live_hours, now) {
            Verdict::Retained => report.retained += 1,
            Verdict::Removed => report.removed += 1,
            Verdict::Vanished => {}
            Verdict::Failed => report.failed += 1,
        }
    }

    info!(
        root = %root.display(),
        time_to_live_hours,
        retained = report.retained,
        removed = report.removed,
        failed = report.failed,
        "retention sweep finished"
    );
    report
}

fn examine(path: &Path, time_to_live_hours: f64, now: SystemTime) -> Verdict {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(e) if e.kind() == ErrorKind::NotFound => return Verdict::Vanished,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read modification time");
            return Verdict::Failed;
        }
    };

    // Files stamped in the future count as brand new.
    let age_hours = now
        .duration_since(modified)
        .map(|age| age.as_secs_f64() / 3600.0)
        .unwrap_or(0.0);
    if age_hours <= time_to_live_hours {
        return Verdict::Retained;
    }

    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), age_hours, "deleted expired archive");
            Verdict::Removed
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Verdict::Vanished,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot delete expired archive");
            Verdict::Failed
        }
    }
}
