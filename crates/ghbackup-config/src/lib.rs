// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for ghbackup.
//!
//! Layers compiled defaults, an optional TOML file, and environment
//! variables with Figment, validates the result, and renders failures as
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use ghbackup_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("organizations: {:?}", config.organizations);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod run_config;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_str};
pub use model::BackupConfig;
pub use run_config::{DestinationConfig, LogFormat, RunConfig};

/// Load configuration from `path` (or `./ghbackup.toml`) and the environment,
/// then validate it.
pub fn load_and_validate(path: Option<&Path>) -> Result<RunConfig, Vec<ConfigError>> {
    match loader::load_config(path) {
        Ok(config) => validation::validate_config(&config),
        Err(err) => {
            let file = loader::config_path(path);
            let source = std::fs::read_to_string(&file)
                .ok()
                .map(|content| (file.display().to_string(), content));
            Err(diagnostic::figment_to_config_errors(err, source.as_ref()))
        }
    }
}

/// Load configuration from a TOML string only and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<RunConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => validation::validate_config(&config),
        Err(err) => {
            let source = ("<inline>".to_string(), toml_content.to_string());
            Err(diagnostic::figment_to_config_errors(err, Some(&source)))
        }
    }
}
