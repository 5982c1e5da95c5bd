// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget metrics capability.

use crate::types::Outcome;

/// Records discovery counts and per-repository outcomes.
///
/// Calls never fail and never block on I/O.
pub trait MetricsSink: Send + Sync {
    /// Add `count` discovered repositories for `organization`.
    fn record_discovered(&self, organization: &str, count: u64);

    /// Count one attempted repository as success or failure.
    fn record_outcome(&self, outcome: &Outcome);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_discovered(&self, _organization: &str, _count: u64) {}

    fn record_outcome(&self, _outcome: &Outcome) {}
}
