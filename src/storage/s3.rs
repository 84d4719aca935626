// backupshipper/src/storage/s3.rs
use aws_sdk_s3 as s3;
use s3::config::{Credentials, Region, RequestChecksumCalculation};
use s3::primitives::ByteStream;
use std::path::Path;
use tracing::debug;

use super::ObjectStore;
use crate::config::StorageCredentials;
use crate::errors::{AppError, Result};

/// A bucket on an S3-compatible object store (AWS S3, Google Cloud Storage
/// interoperability endpoint, DigitalOcean Spaces, MinIO).
pub struct S3Bucket {
    client: s3::Client,
    bucket: String,
}

impl S3Bucket {
    /// Builds an authenticated client from the credential file contents and
    /// binds it to `bucket`. No request is sent until the first operation.
    pub async fn connect(credentials: &StorageCredentials, bucket: &str) -> Result<Self> {
        if bucket.is_empty() {
            return Err(AppError::InvalidInput("bucket name cannot be empty".to_string()));
        }

        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(Credentials::new(
                &credentials.access_key_id,
                &credentials.secret_access_key,
                None, // session_token
                None, // expiry
                "BackupKeyFile", // provider_name
            ));
        if let Some(endpoint) = &credentials.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        debug!(
            "S3 client for bucket {} (endpoint: {}, region: {})",
            bucket,
            credentials.endpoint_url.as_deref().unwrap_or("default"),
            credentials.region
        );

        Ok(S3Bucket {
            client: s3::Client::from_conf(client_config(&sdk_config, credentials)),
            bucket: bucket.to_string(),
        })
    }
}

/// Non-AWS endpoints reject the flexible checksums newer SDKs send by
/// default, so checksums are only added where an operation demands them.
fn client_config(sdk_config: &aws_config::SdkConfig, credentials: &StorageCredentials) -> s3::Config {
    s3::config::Builder::from(sdk_config)
        .force_path_style(credentials.force_path_style)
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .build()
}

impl ObjectStore for S3Bucket {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, key: &str, local_path: &Path) -> Result<()> {
        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create ByteStream from file {}: {}",
                local_path.display(),
                e
            ))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await?;

        debug!("put_object {}/{} <- {}", self.bucket, key, local_path.display());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_string),
            );
        }

        debug!("Listed {} object(s) under {}/{}", keys.len(), self.bucket, prefix);
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;

        debug!("delete_object {}/{}", self.bucket, key);
        Ok(())
    }
}
