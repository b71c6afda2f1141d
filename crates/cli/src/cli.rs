//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// logcourier - log aggregation and chat-delivery engine
#[derive(Parser, Debug)]
#[command(
    name = "logcourier",
    author,
    version,
    about = "Log aggregation and multi-destination dispatch engine",
    long_about = "An in-process log aggregation engine.\n\n\
                  Ingests structured log events, keeps the most recent records in a \n\
                  bounded store, fans them out to local sinks, and batches qualifying \n\
                  records to remote chat-style destinations."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "COURIER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "COURIER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the aggregation engine on a stream of log events
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "courier.toml", env = "COURIER_CONFIG")]
    pub config: PathBuf,

    /// JSON-lines event input file (defaults to stdin)
    #[arg(short, long, env = "COURIER_INPUT")]
    pub input: Option<PathBuf>,

    /// Maximum number of records to ingest (0 = unlimited)
    #[arg(long, default_value = "0", env = "COURIER_MAX_RECORDS")]
    pub max_records: u64,

    /// Engine timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "COURIER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "COURIER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "courier.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "courier.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show local sink configuration
    #[arg(long)]
    pub sinks: bool,

    /// Show remote destination configuration
    #[arg(long)]
    pub destinations: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
