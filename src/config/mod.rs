// backupshipper/src/config/mod.rs
use crate::errors::{AppError, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_REGION: &str = "us-east-1";

/// Command line surface. Every flag can also come from the environment
/// (or a `.env` file loaded by `main`); explicit flags win.
#[derive(Debug, Clone, Parser)]
#[command(name = "backupshipper")]
#[command(about = "Upload backup files to object storage and prune old backup sets")]
pub struct CliArgs {
    /// Logical site name, used as the first key segment
    #[arg(long, env = "BACKUP_SITE")]
    pub site: String,

    /// Target bucket name
    #[arg(long, env = "BACKUP_BUCKET")]
    pub bucket: String,

    /// Credential file (JSON) for the object store
    #[arg(long = "key-file", env = "BACKUP_KEY_FILE")]
    pub key_file: PathBuf,

    /// Backup set identifier. Must sort correctly as a string, e.g. 20240101120000
    #[arg(long, env = "BACKUP_TIMESTAMP")]
    pub timestamp: String,

    /// Number of most recent backup sets to retain
    #[arg(long, env = "BACKUP_KEEP", default_value_t = 10)]
    pub keep: usize,

    /// Local directory to scan and clear
    #[arg(long = "backup-dir", env = "BACKUP_DIR")]
    pub backup_dir: PathBuf,

    /// Unix timestamp; only files modified at or after it are uploaded
    #[arg(long, env = "BACKUP_SINCE", allow_hyphen_values = true)]
    pub since: f64,
}

// Structs for deserializing the credential file
#[derive(Debug, Clone, Deserialize)]
pub struct JsonCredentialFile {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
    pub force_path_style: Option<bool>,
}

// Application's internal configuration structs
#[derive(Clone)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint_url: Option<String>,
    pub region: String,
    pub force_path_style: bool,
}

// Keeps the secret out of `{:?}` output, which main prints on failure.
impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ShipperConfig {
    pub site: String,
    pub bucket: String,
    pub key_file: PathBuf,
    pub timestamp: String,
    pub keep: usize,
    pub backup_dir: PathBuf,
    pub since: f64,
}

impl ShipperConfig {
    /// Validates parsed CLI arguments. The timestamp's sort order is the
    /// caller's responsibility and is not checked here.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        validate_key_segment("site", &args.site)?;
        validate_key_segment("timestamp", &args.timestamp)?;

        if args.bucket.trim().is_empty() {
            return Err(AppError::InvalidInput("bucket cannot be empty".to_string()));
        }
        if !args.since.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "since must be a finite unix timestamp, got {}",
                args.since
            )));
        }
        if !args.backup_dir.is_dir() {
            return Err(AppError::Config(format!(
                "backup directory does not exist or is not a directory: {}",
                args.backup_dir.display()
            )));
        }

        Ok(ShipperConfig {
            site: args.site,
            bucket: args.bucket,
            key_file: args.key_file,
            timestamp: args.timestamp,
            keep: args.keep,
            backup_dir: args.backup_dir,
            since: args.since,
        })
    }
}

/// `site` and `timestamp` become the first two segments of every object key,
/// so neither may be empty or contain the separator.
fn validate_key_segment(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} cannot be empty", name)));
    }
    if value.contains('/') {
        return Err(AppError::InvalidInput(format!(
            "{} must not contain '/': {}",
            name, value
        )));
    }
    Ok(())
}

impl StorageCredentials {
    pub fn load_from_json(key_file: &Path) -> Result<Self> {
        let content = fs::read_to_string(key_file).map_err(|e| {
            AppError::Config(format!(
                "Failed to read credential file at {}: {}",
                key_file.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: JsonCredentialFile = serde_json::from_str(content)?;

        let access_key_id = raw
            .access_key_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Config("access_key_id must be set in the credential file".to_string()))?;
        let secret_access_key = raw
            .secret_access_key
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Config("secret_access_key must be set in the credential file".to_string()))?;

        let endpoint_url = match raw.endpoint_url.filter(|s| !s.is_empty()) {
            Some(endpoint) => {
                let parsed = Url::parse(&endpoint)?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::Config(format!(
                        "endpoint_url must be an http(s) URL: {}",
                        endpoint
                    )));
                }
                Some(endpoint)
            }
            None => None,
        };

        Ok(StorageCredentials {
            access_key_id,
            secret_access_key,
            endpoint_url,
            region: raw
                .region
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            force_path_style: raw.force_path_style.unwrap_or(false),
        })
    }
}
