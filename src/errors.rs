use thiserror::Error;

// Variants wrapping another error leave it out of their message; it is
// reported once as the source when the chain is printed.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("AWS SDK S3 error: {0}")]
    S3Sdk(String), // General S3 SDK errors

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Serde JSON error")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// The SDK error carries the operation error type as a generic parameter, so
// every S3 call site collapses into the same variant here.
impl<E, R> From<aws_sdk_s3::error::SdkError<E, R>> for AppError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    fn from(err: aws_sdk_s3::error::SdkError<E, R>) -> Self {
        AppError::S3Sdk(aws_sdk_s3::error::DisplayErrorContext(&err).to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_wrapped_io_error_appears_once_in_chain() {
        let err = anyhow::Error::from(AppError::from(Error::new(
            ErrorKind::NotFound,
            "No such file or directory",
        )))
        .context("Failed to list backup directory: /var/backups");

        let rendered = format!("{:?}", err);

        assert_eq!(rendered.matches("No such file or directory").count(), 1);
        assert!(rendered.contains("I/O error"));
    }

    #[test]
    fn test_string_variants_keep_their_detail() {
        let err = AppError::InvalidInput("file name is not valid UTF-8".to_string());
        assert_eq!(err.to_string(), "Invalid input: file name is not valid UTF-8");
    }
}
