//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tbq - time-based queue dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "tbq",
    author,
    version,
    about = "Time-based queue dispatcher",
    long_about = "Publishes items tagged with a processing time to a backing store and \n\
                  polls the store to process items once they are due."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TBQ_VERBOSE")]
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
        env = "TBQ_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Optional settings file (TOML or JSON); environment variables take precedence
    #[arg(short, long, global = true, env = "TBQ_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Consume due items until interrupted
    Run(RunArgs),

    /// Publish a single item
    Publish(PublishArgs),

    /// Display resolved settings
    Settings(SettingsArgs),
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Poll interval in milliseconds
    #[arg(long, default_value = "500", env = "TBQ_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Poll loop runs before giving up
    #[arg(long, default_value = "3", env = "TBQ_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    /// Wait between poll loop runs in milliseconds
    #[arg(long, default_value = "1000", env = "TBQ_RETRY_BACKOFF_MS")]
    pub retry_backoff_ms: u64,

    /// Deadline for a single receive/process call in milliseconds (0 = none)
    #[arg(long, default_value = "0", env = "TBQ_CALL_TIMEOUT_MS")]
    pub call_timeout_ms: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TBQ_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `publish` command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Item payload (UTF-8 text)
    #[arg(short, long)]
    pub payload: String,

    /// Process the item this many seconds from now
    #[arg(long, default_value = "0", conflicts_with = "at")]
    pub delay_secs: i64,

    /// Process the item at this RFC 3339 instant (e.g. 2030-01-01T09:00:00+02:00)
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for the `settings` command
#[derive(Args, Debug)]
pub struct SettingsArgs {
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
