// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded fan-out of the work list over a [`BackupPipeline`].
//!
//! A semaphore caps the number of pipelines in flight. Permits are taken
//! in work-list order before a task is spawned, so dispatch order follows
//! discovery order while completion order is arbitrary. Every task owns its
//! permit and releases it before its outcome is recorded.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use ghbackup_core::{BackupError, BackupPipeline, MetricsSink, Outcome, RepositoryDescriptor, WorkList};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default ceiling on concurrently running pipelines.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Runs one pipeline per repository, at most `max_concurrency` at a time.
pub struct Scheduler {
    pipeline: Arc<dyn BackupPipeline>,
    metrics: Arc<dyn MetricsSink>,
    max_concurrency: usize,
    shutdown: CancellationToken,
}

impl Scheduler {
    /// A ceiling of zero is raised to one.
    pub fn new(
        pipeline: Arc<dyn BackupPipeline>,
        metrics: Arc<dyn MetricsSink>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            pipeline,
            metrics,
            max_concurrency: max_concurrency.max(1),
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop dispatching once `token` is cancelled. Pipelines already
    /// running are left to finish.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Attempt every repository of `work` and wait for all of them.
    ///
    /// Outcomes come back in completion order.
    pub async fn run(&self, work: WorkList) -> Vec<Outcome> {
        let total = work.len();
        let medium = self.pipeline.medium();
        info!(repositories = total, max_concurrency = self.max_concurrency, %medium, "dispatching backups");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut dispatched = 0usize;

        for repository in work {
            let permit = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    warn!(skipped = total - dispatched, "shutdown requested, not dispatching remaining repositories");
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let pipeline = Arc::clone(&self.pipeline);
            let metrics = Arc::clone(&self.metrics);
            tasks.spawn(async move {
                let outcome = attempt(pipeline.as_ref(), repository).await;
                drop(permit);
                metrics.record_outcome(&outcome);
                outcome
            });
            dispatched += 1;
        }

        let mut outcomes = Vec::with_capacity(dispatched);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(error = %e, "backup task did not complete"),
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        info!(
            attempted = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "all dispatched backups finished"
        );
        outcomes
    }
}

/// Run the pipeline once, turning errors and panics into a failed outcome.
async fn attempt(pipeline: &dyn BackupPipeline, repository: RepositoryDescriptor) -> Outcome {
    let result = AssertUnwindSafe(pipeline.backup(&repository))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(BackupError::Internal(format!(
                "pipeline panicked: {}",
                panic_message(panic.as_ref())
            )))
        });

    if let Err(e) = &result {
        error!(repository = %repository, kind = e.kind(), error = %e, "backup failed");
    }

    Outcome {
        repository,
        succeeded: result.is_ok(),
        medium: pipeline.medium(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ghbackup_core::Medium;
    use ghbackup_test_utils::{CountingPipeline, RecordingSink, TestHarness};

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("r{i:02}")).collect()
    }

    fn work(n: usize) -> WorkList {
        let names = names(n);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        TestHarness::work_list("acme", &refs)
    }

    #[tokio::test]
    async fn never_exceeds_max_concurrency() {
        let counting = Arc::new(CountingPipeline::new(Duration::from_millis(25)));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = Scheduler::new(counting.clone(), sink.clone(), 3);

        let outcomes = scheduler.run(work(12)).await;

        assert_eq!(outcomes.len(), 12);
        assert!(counting.peak() <= 3, "peak was {}", counting.peak());
        assert!(counting.peak() >= 2, "expected overlap, peak was {}", counting.peak());
        assert_eq!(counting.active(), 0);
        assert_eq!(sink.counts("acme", Medium::Gcs), (12, 12, 0));
    }

    #[tokio::test]
    async fn dispatch_follows_work_list_order() {
        let counting = Arc::new(CountingPipeline::new(Duration::from_millis(1)));
        let scheduler = Scheduler::new(counting.clone(), Arc::new(RecordingSink::default()), 1);

        scheduler.run(work(5)).await;

        let expected: Vec<String> = names(5).iter().map(|n| format!("acme/{n}")).collect();
        assert_eq!(counting.started(), expected);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_others() {
        let counting = Arc::new(CountingPipeline::new(Duration::from_millis(5)).failing_for("acme/r01"));
        let sink = Arc::new(RecordingSink::default());

        let outcomes = Scheduler::new(counting, sink.clone(), 2).run(work(4)).await;

        assert_eq!(outcomes.len(), 4);
        let failed: Vec<_> = outcomes
            .iter()
            .filter(|o| !o.succeeded)
            .map(|o| o.repository.full_name.as_str())
            .collect();
        assert_eq!(failed, vec!["acme/r01"]);
        assert_eq!(sink.counts("acme", Medium::Gcs), (4, 3, 1));
    }

    #[tokio::test]
    async fn panic_becomes_failed_outcome() {
        let counting = Arc::new(
            CountingPipeline::new(Duration::from_millis(1))
                .with_medium(Medium::Nfs)
                .panicking_for("acme/r00"),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcomes = Scheduler::new(counting, sink.clone(), 2).run(work(3)).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(sink.counts("acme", Medium::Nfs), (3, 2, 1));
    }

    #[tokio::test]
    async fn zero_ceiling_still_makes_progress() {
        let counting = Arc::new(CountingPipeline::new(Duration::from_millis(1)));
        let outcomes = Scheduler::new(counting.clone(), Arc::new(RecordingSink::default()), 0)
            .run(work(3))
            .await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(counting.peak(), 1);
    }

    #[tokio::test]
    async fn empty_work_list_returns_immediately() {
        let counting = Arc::new(CountingPipeline::new(Duration::from_millis(1)));
        let outcomes = Scheduler::new(counting, Arc::new(RecordingSink::default()), 4)
            .run(WorkList::new())
            .await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn cancelled_before_start_dispatches_nothing() {
        let counting = Arc::new(CountingPipeline::new(Duration::from_millis(1)));
        let token = CancellationToken::new();
        token.cancel();

        let outcomes = Scheduler::new(counting.clone(), Arc::new(RecordingSink::default()), 4)
            .with_shutdown(token)
            .run(work(3))
            .await;

        assert!(outcomes.is_empty());
        assert!(counting.started().is_empty());
    }

    #[tokio::test]
    async fn cancellation_lets_in_flight_work_finish() {
        let counting = Arc::new(CountingPipeline::new(Duration::from_millis(300)));
        let sink = Arc::new(RecordingSink::default());
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let outcomes = Scheduler::new(counting.clone(), sink.clone(), 1)
            .with_shutdown(token)
            .run(work(5))
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].succeeded);
        assert_eq!(counting.started(), vec!["acme/r00".to_string()]);
        assert_eq!(sink.counts("acme", Medium::Gcs), (1, 1, 0));
    }
}
