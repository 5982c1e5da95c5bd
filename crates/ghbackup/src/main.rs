// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ghbackup - back up every repository of a set of GitHub organizations.
//!
//! A non-interactive batch job: one invocation performs one run and exits.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod logging;
mod run;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Back up GitHub organizations to a bucket or a shared filesystem.
#[derive(Parser, Debug)]
#[command(name = "ghbackup", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (default: ./ghbackup.toml if present).
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Run one backup of every configured organization (default).
    Run,
    /// Validate configuration and print a redacted summary.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ghbackup_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            ghbackup_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => {
            println!("{}", config.summary());
        }
        Commands::Run => {
            logging::init_tracing(&config.log_level, config.log_format);
            if let Err(e) = run::execute(config).await {
                tracing::error!(kind = e.kind(), error = %e, "backup run aborted");
                std::process::exit(1);
            }
        }
    }
}
