// backupshipper/src/backup/upload.rs
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::storage::{ObjectStore, object_key};
use crate::utils::list_regular_files;

/// What one upload pass did to the remote bucket and the local directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    /// Names uploaded, in directory-listing (name) order.
    pub uploaded: Vec<String>,
    /// Names deleted from the backup directory afterwards.
    pub removed: Vec<String>,
}

/// Uploads every regular file in `backup_dir` modified at or after `since`
/// to `{site}/{timestamp}/{filename}`, then deletes every regular file in
/// `backup_dir`, including the ones too old to upload.
///
/// An upload failure aborts before anything is deleted locally. Objects
/// already written by this pass stay in the bucket.
pub async fn upload_backups<S: ObjectStore>(
    store: &S,
    backup_dir: &Path,
    site: &str,
    timestamp: &str,
    since: f64,
) -> Result<UploadReport> {
    let mut report = UploadReport::default();

    let files = list_regular_files(backup_dir)
        .with_context(|| format!("Failed to list backup directory: {}", backup_dir.display()))?;

    for file in files {
        if file.modified < since {
            debug!(
                "Skipping {} (modified {} is before {})",
                file.name, file.modified, since
            );
            continue;
        }

        let key = object_key(site, timestamp, &file.name);
        store.upload(&key, &file.path).await.with_context(|| {
            format!(
                "Failed to upload {} to bucket {} with key {}",
                file.path.display(),
                store.bucket_name(),
                key
            )
        })?;
        println!("  Uploaded: {}", key);
        report.uploaded.push(file.name);
    }

    // Listed again: the directory is treated as scratch space and emptied
    // of regular files whether or not they qualified for upload.
    let leftovers = list_regular_files(backup_dir)
        .with_context(|| format!("Failed to list backup directory: {}", backup_dir.display()))?;
    for file in leftovers {
        fs::remove_file(&file.path)
            .with_context(|| format!("Failed to delete local file: {}", file.path.display()))?;
        debug!("Removed local file {}", file.path.display());
        report.removed.push(file.name);
    }

    info!(
        "Upload pass finished: {} uploaded, {} removed locally",
        report.uploaded.len(),
        report.removed.len()
    );
    Ok(report)
}
