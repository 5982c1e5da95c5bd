// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the GitHub organization repository listing.
//!
//! Provides [`GithubClient`], which follows `Link: rel="next"` pagination
//! until the last page and reports every page size to the metrics sink.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ghbackup_core::{BackupError, MetricsSink, RepositoryDescriptor, RepositoryLister};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::link::next_link;
use crate::types::ApiRepository;

/// Default GitHub REST API base URL.
pub const API_BASE_URL: &str = "https://api.github.com";

/// Repositories requested per page (GitHub's maximum).
const PER_PAGE: &str = "100";

/// Discovery client for one GitHub API endpoint.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    metrics: Arc<dyn MetricsSink>,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Build a client authenticating with `token`.
    pub fn new(token: &SecretString, metrics: Arc<dyn MetricsSink>) -> Result<Self, BackupError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("Backup"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| BackupError::Config(format!("invalid GitHub token header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BackupError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            metrics,
        })
    }

    /// Overrides the API base URL (GitHub Enterprise, wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch one page, returning its repositories and the next page URL.
    async fn fetch_page(
        &self,
        organization: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<(Vec<ApiRepository>, Option<String>), BackupError> {
        let response = request.send().await.map_err(|e| BackupError::Discovery {
            organization: organization.to_string(),
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(organization, status = %status, url = %response.url(), "listing page received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackupError::discovery(
                organization,
                format!("GitHub returned {status}: {}", body.trim()),
            ));
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);

        let body = response.text().await.map_err(|e| BackupError::Discovery {
            organization: organization.to_string(),
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        let page: Vec<ApiRepository> =
            serde_json::from_str(&body).map_err(|e| BackupError::Discovery {
                organization: organization.to_string(),
                message: format!("failed to parse repository page: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok((page, next))
    }
}

#[async_trait]
impl RepositoryLister for GithubClient {
    async fn list(&self, organization: &str) -> Result<Vec<RepositoryDescriptor>, BackupError> {
        let first = self
            .client
            .get(format!("{}/orgs/{organization}/repos", self.base_url))
            .query(&[("per_page", PER_PAGE)]);

        let mut repositories = Vec::new();
        let mut visited = HashSet::new();
        let mut request = first;
        let mut pages = 0usize;

        loop {
            let (page, next) = self.fetch_page(organization, request).await?;
            pages += 1;
            self.metrics
                .record_discovered(organization, page.len() as u64);
            repositories.extend(page.into_iter().map(RepositoryDescriptor::from));

            let Some(next) = next else { break };
            if !visited.insert(next.clone()) {
                return Err(BackupError::discovery(
                    organization,
                    format!("pagination loops back to {next}"),
                ));
            }
            request = self.client.get(next);
        }

        info!(
            organization,
            pages,
            repositories = repositories.len(),
            "discovered repositories"
        );
        Ok(repositories)
    }
}
