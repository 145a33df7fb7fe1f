//! # tbq CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 设置解析与展示
//! - 单条发布
//! - 消费循环与优雅关闭

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use config_loader::SettingsResolver;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_consumer, run_publish, run_settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "tbq starting");

    let result = match &cli.command {
        Commands::Run(args) => run_consumer(&cli, args).await,
        Commands::Publish(args) => run_publish(&cli, args).await,
        Commands::Settings(args) => run_settings(&cli, args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
    })
}

/// Settings resolver honoring the global `--config` file
pub(crate) fn settings_resolver(cli: &Cli) -> Result<SettingsResolver> {
    match &cli.config {
        Some(path) => {
            info!(config = %path.display(), "Loading settings file");
            Ok(SettingsResolver::from_env_and_file(path)?)
        }
        None => Ok(SettingsResolver::from_env()),
    }
}
