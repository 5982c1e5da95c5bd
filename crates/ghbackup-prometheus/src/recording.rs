// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric names, descriptions, and recording helpers.
//!
//! These use the metrics-rs macros and therefore record into whatever
//! recorder is current; [`crate::PrometheusSink`] scopes them to its own.

use ghbackup_core::Outcome;
use metrics::describe_counter;

pub const REPO_FOUND_TOTAL: &str = "repo_found_total_count";
pub const REPO_BACKUP_TOTAL: &str = "repo_backup_total_count";
pub const REPO_BACKUP_FAILURE: &str = "repo_backup_failure_count";
pub const REPO_BACKUP_SUCCESS: &str = "repo_backup_success_count";

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(REPO_FOUND_TOTAL, "Repositories discovered per organization");
    describe_counter!(REPO_BACKUP_TOTAL, "Repositories attempted");
    describe_counter!(REPO_BACKUP_FAILURE, "Repositories whose backup failed");
    describe_counter!(REPO_BACKUP_SUCCESS, "Repositories backed up successfully");
}

/// Add one discovered page worth of repositories.
pub fn record_discovered(organization: &str, count: u64) {
    metrics::counter!(REPO_FOUND_TOTAL, "org" => organization.to_string()).increment(count);
}

/// Count one attempt. Total always moves together with exactly one of
/// success or failure.
pub fn record_outcome(outcome: &Outcome) {
    let org = outcome.repository.owner_login.clone();
    let medium = outcome.medium.to_string();
    metrics::counter!(REPO_BACKUP_TOTAL, "org" => org.clone(), "medium" => medium.clone())
        .increment(1);
    let name = if outcome.succeeded {
        REPO_BACKUP_SUCCESS
    } else {
        REPO_BACKUP_FAILURE
    };
    metrics::counter!(name, "org" => org, "medium" => medium).increment(1);
}
