//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// mocap-sync - synchronize heterogeneous motion-capture channels
#[derive(Parser, Debug)]
#[command(
    name = "mocap-sync",
    author,
    version,
    about = "Motion-capture acquisition synchronizer",
    long_about = "Aligns marker and analog channels recorded at different rates onto one \n\
                  frame clock, derives force platform metadata, and writes the result as \n\
                  JSON plus an optional binary frame block in a legacy byte order."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MOCAP_SYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MOCAP_SYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default level when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize an input description and write the acquisition
    Sync(SyncArgs),

    /// Validate a session configuration file
    Validate(ValidateArgs),

    /// Display channel groups and the derived common analog frequency
    Info(InfoArgs),
}

/// Arguments for the `sync` command
#[derive(Parser, Debug, Clone)]
pub struct SyncArgs {
    /// Input description: channel groups and platforms (TOML or JSON)
    #[arg(short, long, env = "MOCAP_SYNC_INPUT")]
    pub input: PathBuf,

    /// Session configuration (TOML or JSON); defaults apply when absent
    #[arg(short, long, env = "MOCAP_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Synchronized acquisition as JSON
    #[arg(short, long)]
    pub output: PathBuf,

    /// Binary frame block, encoded with the configured output options
    #[arg(long)]
    pub data: Option<PathBuf>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the session configuration to validate
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Input description (TOML or JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Session configuration used for the common rate search
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
