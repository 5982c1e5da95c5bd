// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory metrics sink.

use std::collections::HashMap;
use std::sync::Mutex;

use ghbackup_core::{Medium, MetricsSink, Outcome};

/// Metrics sink that keeps every recorded value for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    discovered: Mutex<HashMap<String, u64>>,
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingSink {
    /// Sum of all discovery counts recorded for `organization`.
    pub fn discovered(&self, organization: &str) -> u64 {
        self.discovered
            .lock()
            .map(|m| m.get(organization).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Every outcome in completion order.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// `(total, success, failure)` for one organization and medium.
    pub fn counts(&self, organization: &str, medium: Medium) -> (u64, u64, u64) {
        let outcomes = self.outcomes();
        let matching: Vec<_> = outcomes
            .iter()
            .filter(|o| o.repository.owner_login == organization && o.medium == medium)
            .collect();
        let success = matching.iter().filter(|o| o.succeeded).count() as u64;
        let total = matching.len() as u64;
        (total, success, total - success)
    }
}

impl MetricsSink for RecordingSink {
    fn record_discovered(&self, organization: &str, count: u64) {
        if let Ok(mut map) = self.discovered.lock() {
            *map.entry(organization.to_string()).or_default() += count;
        }
    }

    fn record_outcome(&self, outcome: &Outcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome.clone());
        }
    }
}
