use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use super::ObjectStore;
use crate::errors::{AppError, Result};

/// In-memory bucket for tests.
#[derive(Default)]
pub struct MemoryBucket {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    deletes: Mutex<Vec<String>>,
    fail_upload_key: Option<String>,
}

impl MemoryBucket {
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bucket = MemoryBucket::default();
        {
            let mut objects = bucket.objects.lock().unwrap();
            for key in keys {
                objects.insert(key.into(), Vec::new());
            }
        }
        bucket
    }

    /// Makes the upload to `key` fail with a storage error.
    pub fn failing_upload_to(key: &str) -> Self {
        MemoryBucket {
            fail_upload_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

impl ObjectStore for MemoryBucket {
    fn bucket_name(&self) -> &str {
        "memory"
    }

    async fn upload(&self, key: &str, local_path: &Path) -> Result<()> {
        if self.fail_upload_key.as_deref() == Some(key) {
            return Err(AppError::Storage(format!("simulated upload failure for {}", key)));
        }
        let data = std::fs::read(local_path)?;
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
