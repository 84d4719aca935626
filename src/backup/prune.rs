// backupshipper/src/backup/prune.rs
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::debug;

use crate::storage::{ObjectStore, backup_set_prefix, timestamp_segment};

/// Deletes every backup set of `site` except the `keep` newest ones.
///
/// Sets are ordered by their timestamp segment compared as strings, so the
/// caller must use timestamps that sort lexicographically (e.g. `YYYYMMDDHHMMSS`).
/// Returns the pruned timestamps, newest first.
pub async fn prune_old_backups<S: ObjectStore>(store: &S, site: &str, keep: usize) -> Result<Vec<String>> {
    let site_prefix = format!("{}/", site);
    let keys = store
        .list(&site_prefix)
        .await
        .with_context(|| format!("Failed to list objects under {}", site_prefix))?;

    let timestamps: BTreeSet<String> = keys
        .iter()
        .filter_map(|key| timestamp_segment(key))
        .map(str::to_string)
        .collect();
    let total = timestamps.len();
    let to_prune: Vec<String> = timestamps.into_iter().rev().skip(keep).collect();

    if to_prune.is_empty() {
        println!("  {} backup(s) in bucket, nothing to prune.", total);
        return Ok(to_prune);
    }

    for timestamp in &to_prune {
        let set_prefix = backup_set_prefix(site, timestamp);
        println!("  Pruning: {}", set_prefix);

        let set_keys = store
            .list(&set_prefix)
            .await
            .with_context(|| format!("Failed to list objects under {}", set_prefix))?;
        for key in set_keys {
            store
                .delete(&key)
                .await
                .with_context(|| format!("Failed to delete object {}", key))?;
            debug!("Deleted {}", key);
        }
    }

    println!("  Pruned {} old backup(s).", to_prune.len());
    Ok(to_prune)
}
