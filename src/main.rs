//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `energygrid_client` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use energygrid_client::initialization::init_logger_with;
use energygrid_client::{run_aggregation, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load ENERGYGRID_TOKEN / ENERGYGRID_BASE_URL from .env if present
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config: Config = Opt::parse().into();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run_aggregation(config).await {
        Ok(report) => {
            let summary = &report.summary;
            println!(
                "Aggregated {} device{} ({} online, {} offline) in {:.1}s",
                summary.total,
                if summary.total == 1 { "" } else { "s" },
                summary.online,
                summary.offline,
                report.metadata.duration_ms as f64 / 1000.0
            );
            println!(
                "Total power: {:.2} kW, average: {:.2} kW",
                summary.total_power, summary.average_power
            );
            if !summary.failed_batches.is_empty() {
                println!(
                    "{} of {} batches failed: {}",
                    summary.failed_batches.len(),
                    report.metadata.batches_total,
                    summary
                        .failed_batches
                        .iter()
                        .map(|f| f.batch_index.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("energygrid_client error: {:#}", e);
            process::exit(1);
        }
    }
}
