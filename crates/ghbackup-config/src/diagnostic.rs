// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::KNOWN_KEYS;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration file.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(ghbackup::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref()))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// Source span for the offending key.
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        /// The source file content for context display.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(ghbackup::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// The key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
        /// What type was expected.
        expected: String,
    },

    /// A required value is absent.
    #[error("missing required setting `{key}`")]
    #[diagnostic(
        code(ghbackup::config::missing_key),
        help("set the {env} environment variable or `{key}` in ghbackup.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
        /// Environment variable that supplies the key.
        env: String,
    },

    /// A value is present but semantically invalid.
    #[error("validation error: {message}")]
    #[diagnostic(code(ghbackup::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(ghbackup::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn missing(key: &str) -> Self {
        Self::MissingKey {
            key: key.to_string(),
            env: env_var_for(key),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Environment variable name that feeds `key`.
pub fn env_var_for(key: &str) -> String {
    let upper = key.to_ascii_uppercase();
    if crate::loader::PLAIN_ENV_VARS.contains(&upper.as_str()) {
        upper
    } else {
        format!("GHBACKUP_{upper}")
    }
}

fn format_unknown_key_help(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {}", KNOWN_KEYS.join(", ")),
        None => format!("valid keys: {}", KNOWN_KEYS.join(", ")),
    }
}

/// Convert a `figment::Error` into one `ConfigError` per contained error.
///
/// `toml_source` is the `(path, content)` of the file that was read, if
/// any, used to point at the offending key.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_source: Option<&(String, String)>,
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, _) => {
                let suggestion = suggest_key(field, KNOWN_KEYS);
                let (span, src) = toml_source
                    .and_then(|(path, content)| {
                        find_key_offset(content, field).map(|offset| {
                            (
                                Some(SourceSpan::new(offset.into(), field.len())),
                                Some(NamedSource::new(path, content.clone())),
                            )
                        })
                    })
                    .unwrap_or((None, None));
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion,
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::missing(field),
            Kind::InvalidType(actual, expected) => {
                let key = error
                    .path
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(".");
                ConfigError::InvalidType {
                    key,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Byte offset of a top-level `field = ...` line in TOML content.
pub fn find_key_offset(content: &str, field: &str) -> Option<usize> {
    let mut byte_offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field)
            && (after.starts_with(' ') || after.starts_with('=') || after.starts_with('\t'))
        {
            return Some(byte_offset + (line.len() - trimmed.len()));
        }
        byte_offset += line.len();
    }
    None
}

/// Suggest a similar key name using Jaro-Winkler similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_org_names_for_typo() {
        assert_eq!(
            suggest_key("org_nmaes", KNOWN_KEYS),
            Some("org_names".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        assert_eq!(suggest_key("zzzzzz", KNOWN_KEYS), None);
    }

    #[test]
    fn finds_offset_of_top_level_key() {
        let content = "org_names = \"acme\"\n  bucket_nmae = \"b\"\n";
        let offset = find_key_offset(content, "bucket_nmae").unwrap();
        assert_eq!(&content[offset..offset + 11], "bucket_nmae");
    }

    #[test]
    fn env_var_names_follow_prefix_rules() {
        assert_eq!(env_var_for("github_token"), "GITHUB_TOKEN");
        assert_eq!(env_var_for("max_concurrency"), "GHBACKUP_MAX_CONCURRENCY");
    }

    #[test]
    fn variant_fields_reach_rendered_messages() {
        let unknown = ConfigError::UnknownKey {
            key: "org_nmaes".to_string(),
            suggestion: Some("org_names".to_string()),
            span: None,
            src: None,
        };
        assert_eq!(unknown.to_string(), "unknown configuration key `org_nmaes`");
        let help = unknown.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("org_names"), "{help}");

        let missing = ConfigError::missing("max_concurrency");
        let help = missing.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("GHBACKUP_MAX_CONCURRENCY"), "{help}");

        let invalid = ConfigError::validation("max_concurrency must be at least 1");
        assert_eq!(
            invalid.to_string(),
            "validation error: max_concurrency must be at least 1"
        );
    }
}
