//! `settings` command implementation.

use anyhow::{Context, Result};
use contracts::Settings;
use dispatcher::SourceRegistry;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, SettingsArgs};
use crate::settings_resolver;

/// Settings report for JSON output
#[derive(Serialize)]
struct SettingsReport<'a> {
    settings: &'a Settings,
    supported: bool,
    available_sources: Vec<&'a str>,
}

/// Execute the `settings` command
pub fn run_settings(cli: &Cli, args: &SettingsArgs) -> Result<()> {
    let settings = settings_resolver(cli)?
        .resolve()
        .context("Failed to resolve settings")?;
    let registry = SourceRegistry::with_defaults();

    let report = SettingsReport {
        settings: &settings,
        supported: registry.contains(&settings.source_type),
        available_sources: registry.source_types(),
    };

    info!(source_type = %settings.source_type, "Settings resolved");

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize settings report")?;
        println!("{}", json);
    } else {
        print_settings(&report);
    }

    Ok(())
}

fn print_settings(report: &SettingsReport<'_>) {
    let settings = report.settings;
    println!("\n=== tbq Settings ===\n");
    println!(
        "Source type: {}{}",
        settings.source_type,
        if report.supported { "" } else { " (unsupported)" }
    );
    println!("Available sources: {}", report.available_sources.join(", "));
    println!("\nRedis:");
    println!("  Address: {}", settings.redis.address());
    println!("  Database: {}", settings.redis.database);
    println!(
        "  Password: {}",
        if settings.redis.password.is_empty() {
            "(none)"
        } else {
            "***"
        }
    );
    println!();
}
