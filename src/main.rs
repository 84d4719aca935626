//! Backup shipper
//!
//! Uploads freshly produced backup files to an object store bucket under
//! `{site}/{timestamp}/`, clears the local backup directory, and prunes all
//! but the newest backup sets.

// backupshipper/src/main.rs
mod backup;
mod config;
mod errors;
mod storage;
mod utils;

use anyhow::{Context, Result};
use backup::ShipOutcome;
use clap::Parser;
use config::{CliArgs, ShipperConfig, StorageCredentials};
use std::process::ExitCode;
use storage::S3Bucket;
use tracing::info;

/// Main entry point for the backup shipper
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; flags and the real environment still apply.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    match run_app(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(args: CliArgs) -> Result<()> {
    let config = ShipperConfig::from_args(args).context("Invalid arguments")?;

    let credentials = StorageCredentials::load_from_json(&config.key_file).with_context(|| {
        format!("Failed to load credentials from {}", config.key_file.display())
    })?;
    let store = S3Bucket::connect(&credentials, &config.bucket)
        .await
        .with_context(|| format!("Failed to open bucket {}", config.bucket))?;

    info!(
        "Shipping {} to bucket {} as {}/{} (keep {})",
        config.backup_dir.display(),
        config.bucket,
        config.site,
        config.timestamp,
        config.keep
    );

    match backup::run_backup_flow(&store, &config).await.context("Backup shipping failed")? {
        ShipOutcome::NothingUploaded => info!("Nothing shipped; remote backups left untouched"),
        ShipOutcome::Shipped { uploaded, pruned } => info!(
            "Shipped {} file(s), pruned {} backup set(s)",
            uploaded.len(),
            pruned.len()
        ),
    }
    Ok(())
}
