pub(crate) mod s3;
#[cfg(test)]
pub(crate) mod memory;

use crate::errors::Result;
use std::path::Path;

pub use s3::S3Bucket;

/// Bucket-level operations the shipper needs from an object store.
///
/// Calls complete one at a time; implementations don't need to be shareable
/// across tasks.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    fn bucket_name(&self) -> &str;

    /// Writes the file at `local_path` to `key`, replacing any existing object.
    async fn upload(&self, key: &str, local_path: &Path) -> Result<()>;

    /// Returns every key that starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// `{site}/{timestamp}/{filename}`
pub fn object_key(site: &str, timestamp: &str, filename: &str) -> String {
    format!("{}/{}/{}", site, timestamp, filename)
}

/// Prefix shared by every object in one backup set: `{site}/{timestamp}/`.
pub fn backup_set_prefix(site: &str, timestamp: &str) -> String {
    format!("{}/{}/", site, timestamp)
}

/// Extracts the timestamp segment from a key, if it has a non-empty one.
pub fn timestamp_segment(key: &str) -> Option<&str> {
    key.split('/').nth(1).filter(|segment| !segment.is_empty())
}
