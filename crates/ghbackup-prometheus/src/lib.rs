// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for ghbackup.
//!
//! [`PrometheusSink`] owns its recorder instead of installing a global one,
//! so several sinks can coexist in one process (tests run in parallel).
//! The recorder is entered with [`metrics::with_local_recorder`] for the
//! duration of each recording call.

pub mod recording;
pub mod server;

use ghbackup_core::{MetricsSink, Outcome};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

pub use server::{bind, router, serve};

/// [`MetricsSink`] backed by a private Prometheus registry.
pub struct PrometheusSink {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl std::fmt::Debug for PrometheusSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusSink").finish_non_exhaustive()
    }
}

impl Default for PrometheusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusSink {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, recording::register_metrics);
        Self { recorder, handle }
    }

    /// Current registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl MetricsSink for PrometheusSink {
    fn record_discovered(&self, organization: &str, count: u64) {
        metrics::with_local_recorder(&self.recorder, || {
            recording::record_discovered(organization, count)
        });
    }

    fn record_outcome(&self, outcome: &Outcome) {
        metrics::with_local_recorder(&self.recorder, || recording::record_outcome(outcome));
    }
}
