// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Cloud Storage upload through the JSON API.
//!
//! Uses simple media uploads (`uploadType=media`) with the file streamed
//! from disk. Access tokens come from a static value or from the GCE
//! metadata server, cached until shortly before expiry.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ghbackup_core::paths::object_key;
use ghbackup_core::{BackupError, ObjectStore};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Default JSON API endpoint.
pub const GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// Default service-account token URL on GCE / GKE.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh cached tokens this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: SecretString,
    refresh_at: Instant,
}

/// Where upload credentials come from.
enum TokenSource {
    Static(SecretString),
    Metadata {
        url: String,
        cache: Mutex<Option<CachedToken>>,
    },
}

/// [`ObjectStore`] writing to Google Cloud Storage.
pub struct GcsObjectStore {
    client: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

impl std::fmt::Debug for GcsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match self.tokens {
            TokenSource::Static(_) => "static",
            TokenSource::Metadata { .. } => "metadata",
        };
        f.debug_struct("GcsObjectStore")
            .field("endpoint", &self.endpoint)
            .field("token_source", &source)
            .finish()
    }
}

impl GcsObjectStore {
    /// Build the store. Without `token` the metadata server is used.
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, token: Option<SecretString>) -> Result<Self, BackupError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BackupError::Config(format!("unable to create gcs client: {e}")))?;

        let tokens = match token {
            Some(token) => TokenSource::Static(token),
            None => TokenSource::Metadata {
                url: METADATA_TOKEN_URL.to_string(),
                cache: Mutex::new(None),
            },
        };

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Overrides the metadata token URL (for testing with wiremock).
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        if let TokenSource::Metadata { url: current, .. } = &mut self.tokens {
            *current = url.into();
        }
        self
    }

    async fn access_token(&self) -> Result<SecretString, BackupError> {
        match &self.tokens {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata { url, cache } => {
                let mut cached = cache.lock().await;
                if let Some(token) = cached.as_ref()
                    && Instant::now() < token.refresh_at
                {
                    return Ok(token.value.clone());
                }

                let fetched = self.fetch_metadata_token(url).await?;
                let lifetime = Duration::from_secs(fetched.expires_in);
                let value = SecretString::from(fetched.access_token);
                *cached = Some(CachedToken {
                    value: value.clone(),
                    refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
                });
                debug!(expires_in = lifetime.as_secs(), "fetched metadata access token");
                Ok(value)
            }
        }
    }

    async fn fetch_metadata_token(&self, url: &str) -> Result<MetadataToken, BackupError> {
        let token_err = |message: String, source: Option<Box<dyn std::error::Error + Send + Sync>>| {
            BackupError::Persist {
                path: Default::default(),
                message,
                source,
            }
        };
        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| token_err(format!("metadata token request failed: {e}"), Some(Box::new(e))))?;
        let status = response.status();
        if !status.is_success() {
            return Err(token_err(format!("metadata server returned {status}"), None));
        }
        response
            .json::<MetadataToken>()
            .await
            .map_err(|e| token_err(format!("invalid metadata token response: {e}"), Some(Box::new(e))))
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn put_file(
        &self,
        file: &Path,
        bucket: &str,
        object_base: &str,
    ) -> Result<u64, BackupError> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BackupError::persist(file, "archive path has no file name", None))?;
        let key = object_key(object_base, &file_name);

        let handle = tokio::fs::File::open(file)
            .await
            .map_err(|e| BackupError::persist(file, "cannot open archive", Some(Box::new(e))))?;
        let size = handle
            .metadata()
            .await
            .map_err(|e| BackupError::persist(file, "cannot stat archive", Some(Box::new(e))))?
            .len();

        let token = self.access_token().await.map_err(|e| match e {
            BackupError::Persist { message, source, .. } => BackupError::Persist {
                path: file.to_path_buf(),
                message,
                source,
            },
            other => other,
        })?;

        info!(file = %file_name, object = %key, bucket, "copying archive to bucket");
        let response = self
            .client
            .post(format!("{}/upload/storage/v1/b/{bucket}/o", self.endpoint))
            .query(&[("uploadType", "media"), ("name", key.as_str())])
            .bearer_auth(token.expose_secret())
            .header(CONTENT_TYPE, "application/zip")
            .header(CONTENT_LENGTH, size.to_string())
            .body(reqwest::Body::wrap_stream(ReaderStream::new(handle)))
            .send()
            .await
            .map_err(|e| BackupError::persist(file, format!("upload failed: {e}"), Some(Box::new(e))))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackupError::persist(
                file,
                format!("bucket `{bucket}` rejected `{key}` with {status}: {}", body.trim()),
                None,
            ));
        }

        info!(object = %key, bytes = size, "wrote archive to bucket");
        Ok(size)
    }
}
