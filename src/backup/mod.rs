pub(crate) mod prune;
pub(crate) mod upload;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::ShipperConfig;
use crate::storage::{ObjectStore, backup_set_prefix};

pub use prune::prune_old_backups;
pub use upload::upload_backups;

/// How a shipping run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ShipOutcome {
    /// No file qualified for upload; pruning was skipped.
    NothingUploaded,
    Shipped {
        uploaded: Vec<String>,
        pruned: Vec<String>,
    },
}

/// Public entry point for a shipping run: upload, then prune.
///
/// A run that uploads nothing never prunes, so a misconfigured or empty run
/// can't eat into remote history. Local files are still cleared in that case.
pub async fn run_backup_flow<S: ObjectStore>(store: &S, config: &ShipperConfig) -> Result<ShipOutcome> {
    let report = upload_backups(
        store,
        &config.backup_dir,
        &config.site,
        &config.timestamp,
        config.since,
    )
    .await
    .context("Upload phase failed")?;

    if report.uploaded.is_empty() {
        println!("WARNING: No backup files found to upload!");
        warn!(
            "No file in {} was modified at or after {}; skipping prune",
            config.backup_dir.display(),
            describe_since(config.since)
        );
        return Ok(ShipOutcome::NothingUploaded);
    }

    println!(
        "Uploaded {} file(s) to s3://{}/{}",
        report.uploaded.len(),
        store.bucket_name(),
        backup_set_prefix(&config.site, &config.timestamp)
    );

    let pruned = prune_old_backups(store, &config.site, config.keep)
        .await
        .context("Prune phase failed")?;

    Ok(ShipOutcome::Shipped {
        uploaded: report.uploaded,
        pruned,
    })
}

/// Renders a unix timestamp for humans, falling back to the raw number.
fn describe_since(since: f64) -> String {
    let secs = since.floor();
    let nanos = ((since - secs) * 1e9) as u32;
    match chrono::DateTime::from_timestamp(secs as i64, nanos) {
        Some(at) => format!("{} ({})", at.to_rfc3339(), since),
        None => since.to_string(),
    }
}
