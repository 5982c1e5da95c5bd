// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Checks semantic constraints serde cannot express and resolves the raw
//! [`BackupConfig`] into a [`RunConfig`]. Every problem is collected; there
//! is no fail-fast.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ghbackup_core::Credentials;
use ghbackup_core::paths::validate_relative_name;
use secrecy::SecretString;

use crate::diagnostic::ConfigError;
use crate::model::BackupConfig;
use crate::run_config::{DestinationConfig, LogFormat, RunConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate `config` and resolve it into a [`RunConfig`].
pub fn validate_config(config: &BackupConfig) -> Result<RunConfig, Vec<ConfigError>> {
    let mut errors = Vec::new();

    let username = required(&config.github_user, "github_user", &mut errors);
    let token = required(&config.github_token, "github_token", &mut errors);
    let organizations = required(&config.org_names, "org_names", &mut errors)
        .map(|raw| parse_organizations(&raw, &mut errors))
        .unwrap_or_default();

    let destination = resolve_destination(config, &mut errors);

    if config.max_concurrency < 1 {
        errors.push(ConfigError::validation(format!(
            "max_concurrency must be at least 1, got {}",
            config.max_concurrency
        )));
    }

    if config.work_dir.as_os_str().is_empty() {
        errors.push(ConfigError::validation("work_dir must not be empty"));
    }

    let metrics_addr = match config.metrics_addr.trim() {
        "" => None,
        addr => match addr.parse::<SocketAddr>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(ConfigError::validation(format!(
                    "metrics_addr `{addr}` is not a valid socket address"
                )));
                None
            }
        },
    };

    for (key, url) in [
        ("github_api_url", &config.github_api_url),
        ("github_clone_url", &config.github_clone_url),
        ("gcs_endpoint", &config.gcs_endpoint),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{key} must be an http(s) URL, got `{url}`"
            )));
        }
    }

    let log_level = config.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.log_level
        )));
    }

    let log_format = match config.log_format.trim().to_ascii_lowercase().as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        other => {
            errors.push(ConfigError::validation(format!(
                "log_format must be `pretty` or `json`, got `{other}`"
            )));
            LogFormat::Pretty
        }
    };

    match (username, token, destination) {
        (Some(username), Some(token), Some(destination)) if errors.is_empty() => Ok(RunConfig {
            credentials: Credentials::new(username, token),
            organizations,
            destination,
            max_concurrency: config.max_concurrency,
            work_dir: config.work_dir.clone(),
            metrics_addr,
            metrics_linger: Duration::from_secs(config.metrics_linger_secs),
            purge_work_dirs: config.purge_work_dirs,
            skip_failed_orgs: config.skip_failed_orgs,
            github_api_url: trim_url(&config.github_api_url),
            github_clone_url: trim_url(&config.github_clone_url),
            gcs_endpoint: trim_url(&config.gcs_endpoint),
            gcs_token: config
                .gcs_token
                .as_ref()
                .filter(|t| !t.trim().is_empty())
                .map(|t| SecretString::from(t.trim().to_string())),
            log_level,
            log_format,
        }),
        _ => Err(errors),
    }
}

fn required(value: &Option<String>, key: &str, errors: &mut Vec<ConfigError>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(ConfigError::missing(key));
            None
        }
    }
}

/// Split `ORG_NAMES`, dropping blanks and duplicates but keeping order.
fn parse_organizations(raw: &str, errors: &mut Vec<ConfigError>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut organizations = Vec::new();
    let mut rejected = false;
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if name.contains('/') {
            errors.push(ConfigError::validation(format!(
                "organization `{name}` must not contain `/`"
            )));
            rejected = true;
            continue;
        }
        if let Err(reason) = validate_relative_name(name) {
            errors.push(ConfigError::validation(format!(
                "organization name rejected: {reason}"
            )));
            rejected = true;
            continue;
        }
        if seen.insert(name.to_string()) {
            organizations.push(name.to_string());
        }
    }
    if organizations.is_empty() && !rejected {
        errors.push(ConfigError::validation(
            "org_names must list at least one organization",
        ));
    }
    organizations
}

fn resolve_destination(
    config: &BackupConfig,
    errors: &mut Vec<ConfigError>,
) -> Option<DestinationConfig> {
    let bucket = non_blank(&config.bucket_name);
    let share = non_blank(&config.nfs_share);

    match (bucket, share) {
        (Some(_), Some(_)) => {
            errors.push(ConfigError::validation(
                "BUCKET_NAME and NFS_SHARE are mutually exclusive; set exactly one",
            ));
            None
        }
        (None, None) => {
            errors.push(ConfigError::validation(
                "one of BUCKET_NAME (object store) or NFS_SHARE (filesystem) must be set",
            ));
            None
        }
        (Some(bucket), None) => Some(DestinationConfig::ObjectStore {
            bucket,
            prefix: config.object_prefix.trim().trim_matches('/').to_string(),
        }),
        (None, Some(root)) => match config.time_to_live {
            None => {
                errors.push(ConfigError::missing("time_to_live"));
                None
            }
            Some(ttl) if !ttl.is_finite() || ttl <= 0.0 => {
                errors.push(ConfigError::validation(format!(
                    "time_to_live must be a positive number of hours, got {ttl}"
                )));
                None
            }
            Some(ttl) => Some(DestinationConfig::Filesystem {
                root: PathBuf::from(root),
                time_to_live_hours: ttl,
            }),
        },
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghbackup_core::Medium;
    use secrecy::ExposeSecret;

    fn base() -> BackupConfig {
        BackupConfig {
            github_user: Some("octocat".into()),
            github_token: Some("ghp_token".into()),
            org_names: Some("acme".into()),
            bucket_name: Some("backups".into()),
            ..BackupConfig::default()
        }
    }

    fn has_validation(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn object_store_config_resolves() {
        let run = validate_config(&base()).unwrap();
        assert_eq!(run.credentials.username, "octocat");
        assert_eq!(run.credentials.token.expose_secret(), "ghp_token");
        assert_eq!(run.organizations, vec!["acme"]);
        assert_eq!(run.destination.medium(), Medium::Gcs);
        assert_eq!(run.max_concurrency, 10);
        assert_eq!(run.metrics_addr, Some("0.0.0.0:9090".parse().unwrap()));
    }

    #[test]
    fn missing_required_keys_are_all_reported() {
        let errors = validate_config(&BackupConfig::default()).unwrap_err();
        let missing: Vec<_> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::MissingKey { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["github_user", "github_token", "org_names"]);
        assert!(has_validation(&errors, "must be set"));
    }

    #[test]
    fn filesystem_requires_time_to_live() {
        let config = BackupConfig {
            bucket_name: None,
            nfs_share: Some("/mnt/backup".into()),
            ..base()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { env, .. } if env == "TIME_TO_LIVE")));
    }

    #[test]
    fn filesystem_config_resolves() {
        let config = BackupConfig {
            bucket_name: None,
            nfs_share: Some("/mnt/backup".into()),
            time_to_live: Some(24.0),
            ..base()
        };
        let run = validate_config(&config).unwrap();
        assert_eq!(
            run.destination,
            DestinationConfig::Filesystem {
                root: PathBuf::from("/mnt/backup"),
                time_to_live_hours: 24.0,
            }
        );
    }

    #[test]
    fn both_destinations_are_rejected() {
        let config = BackupConfig {
            nfs_share: Some("/mnt/backup".into()),
            time_to_live: Some(24.0),
            ..base()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "mutually exclusive"));
    }

    #[test]
    fn non_positive_time_to_live_is_rejected() {
        let config = BackupConfig {
            bucket_name: None,
            nfs_share: Some("/mnt/backup".into()),
            time_to_live: Some(0.0),
            ..base()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "time_to_live"));
    }

    #[test]
    fn organizations_are_trimmed_and_deduplicated() {
        let config = BackupConfig {
            org_names: Some(" acme, ,globex,acme ".into()),
            ..base()
        };
        let run = validate_config(&config).unwrap();
        assert_eq!(run.organizations, vec!["acme", "globex"]);
    }

    #[test]
    fn traversal_in_organization_is_rejected() {
        let config = BackupConfig {
            org_names: Some("acme,..".into()),
            ..base()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "organization"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = BackupConfig {
            max_concurrency: 0,
            ..base()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "max_concurrency"));
    }

    #[test]
    fn empty_metrics_addr_disables_endpoint() {
        let config = BackupConfig {
            metrics_addr: String::new(),
            ..base()
        };
        assert!(validate_config(&config).unwrap().metrics_addr.is_none());
    }

    #[test]
    fn bad_log_format_is_rejected() {
        let config = BackupConfig {
            log_format: "xml".into(),
            ..base()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "log_format"));
    }
}
