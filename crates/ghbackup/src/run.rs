// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ghbackup run`: wire the collaborators from configuration and execute
//! one backup run.

use std::sync::Arc;

use ghbackup_config::{DestinationConfig, RunConfig};
use ghbackup_core::BackupError;
use ghbackup_github::{GitCloner, GithubClient};
use ghbackup_pipeline::{BackupRun, RepositoryPipeline, RunOptions};
use ghbackup_prometheus::PrometheusSink;
use ghbackup_storage::{BackupDestination, GcsObjectStore, ZipArchiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

fn build_destination(config: &RunConfig) -> Result<BackupDestination, BackupError> {
    match &config.destination {
        DestinationConfig::ObjectStore { bucket, prefix } => {
            let store = GcsObjectStore::new(config.gcs_endpoint.clone(), config.gcs_token.clone())?;
            Ok(BackupDestination::ObjectStore {
                store: Arc::new(store),
                bucket: bucket.clone(),
                prefix: prefix.clone(),
                work_dir: config.work_dir.clone(),
            })
        }
        DestinationConfig::Filesystem {
            root,
            time_to_live_hours,
        } => Ok(BackupDestination::Filesystem {
            root: root.clone(),
            time_to_live_hours: *time_to_live_hours,
        }),
    }
}

/// Start the scrape endpoint. A bind failure is logged and the run goes on
/// without it.
async fn start_metrics(
    config: &RunConfig,
    sink: &Arc<PrometheusSink>,
    stop: &CancellationToken,
) -> Option<JoinHandle<()>> {
    let addr = config.metrics_addr?;
    let listener = match ghbackup_prometheus::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            warn!(error = %e, "metrics endpoint disabled");
            return None;
        }
    };
    let sink = Arc::clone(sink);
    let stop = stop.clone();
    Some(tokio::spawn(async move {
        if let Err(e) = ghbackup_prometheus::serve(listener, sink, stop).await {
            warn!(error = %e, "metrics endpoint stopped");
        }
    }))
}

pub async fn execute(config: RunConfig) -> Result<(), BackupError> {
    let destination = build_destination(&config)?;
    let sink = Arc::new(PrometheusSink::new());
    let lister = GithubClient::new(&config.credentials.token, sink.clone())?
        .with_base_url(config.github_api_url.clone());

    let shutdown = crate::shutdown::install_signal_handler();
    let stop_metrics = CancellationToken::new();
    let metrics_server = start_metrics(&config, &sink, &stop_metrics).await;

    let pipeline = RepositoryPipeline::new(
        Arc::new(GitCloner::new(config.github_clone_url.clone())),
        Arc::new(ZipArchiver),
        destination.clone(),
        config.credentials.clone(),
    );
    info!(
        organizations = config.organizations.len(),
        medium = %destination.medium(),
        max_concurrency = config.max_concurrency,
        "starting backup run"
    );

    let result = BackupRun::new(
        Arc::new(lister),
        Arc::new(pipeline),
        sink,
        destination,
        config.organizations.clone(),
    )
    .with_options(RunOptions {
        max_concurrency: config.max_concurrency,
        purge_work_dirs: config.purge_work_dirs,
        skip_failed_orgs: config.skip_failed_orgs,
    })
    .with_shutdown(shutdown.clone())
    .execute()
    .await;

    if let Ok(summary) = &result {
        info!(
            discovered = summary.discovered,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped_organizations = summary.skipped_organizations.len(),
            "backup run finished"
        );
    }

    if let Some(server) = metrics_server {
        if !config.metrics_linger.is_zero() && !shutdown.is_cancelled() {
            info!(seconds = config.metrics_linger.as_secs(), "keeping metrics endpoint up");
            tokio::select! {
                () = tokio::time::sleep(config.metrics_linger) => {}
                () = shutdown.cancelled() => {}
            }
        }
        stop_metrics.cancel();
        if let Err(e) = server.await {
            warn!(error = %e, "metrics task failed");
        }
    }

    result.map(|_| ())
}
