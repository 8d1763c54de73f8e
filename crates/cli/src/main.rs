//! # mocap-sync CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Input and session configuration loading
//! - Synchronization with warning report
//! - JSON and binary frame block output

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::debug;

use cli::{Cli, Commands};
use commands::{run_info, run_sync, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: cli.log_level().to_string(),
    })?;

    debug!(version = env!("CARGO_PKG_VERSION"), "mocap-sync starting");

    let result = match &cli.command {
        Commands::Sync(args) => run_sync(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
