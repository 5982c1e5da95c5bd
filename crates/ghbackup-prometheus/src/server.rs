// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal axum server exposing `/metrics` and `/health`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use ghbackup_core::BackupError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::PrometheusSink;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

async fn get_metrics(State(sink): State<Arc<PrometheusSink>>) -> impl IntoResponse {
    ([(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], sink.render())
}

async fn get_health() -> &'static str {
    "ok"
}

/// Routes for the scrape endpoint.
pub fn router(sink: Arc<PrometheusSink>) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/health", get(get_health))
        .with_state(sink)
}

/// Bind the metrics listener.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, BackupError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| BackupError::Config(format!("failed to bind metrics endpoint to {addr}: {e}")))
}

/// Serve until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    sink: Arc<PrometheusSink>,
    shutdown: CancellationToken,
) -> Result<(), BackupError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "metrics endpoint listening");
    }
    axum::serve(listener, router(sink))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| BackupError::Internal(format!("metrics server error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use ghbackup_core::MetricsSink;
    use tower::ServiceExt;

    #[tokio::test]
    async fn metrics_route_renders_registry() {
        let sink = Arc::new(PrometheusSink::new());
        sink.record_discovered("acme", 3);

        let response = router(sink)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            EXPOSITION_CONTENT_TYPE
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(r#"repo_found_total_count{org="acme"} 3"#), "got: {text}");
    }

    #[tokio::test]
    async fn health_route_answers_ok() {
        let response = router(Arc::new(PrometheusSink::new()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn serve_stops_on_cancellation() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let token = CancellationToken::new();
        let handle = tokio::spawn(serve(
            listener,
            Arc::new(PrometheusSink::new()),
            token.clone(),
        ));
        token.cancel();
        handle.await.unwrap().unwrap();
    }
}
