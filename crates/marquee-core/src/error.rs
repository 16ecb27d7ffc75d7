//! Error types for Marquee core operations.
//!
//! Player-side failures (engine errors, unsupported formats, seeks on an
//! unready surface) are handled inside the player and only logged. The types
//! here cover the library surfaces that do report failures to callers: the
//! catalog store, the upload facade and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Marquee core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Catalog lookup or mutation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Upload request could not be served.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// File system operation failed.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a missing catalog title.
    pub fn title_not_found(id: impl Into<String>) -> Self {
        Self::Catalog(CatalogError::NotFound { id: id.into() })
    }

    /// Shorthand for a rejected field value.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Catalog(CatalogError::InvalidField {
            field,
            reason: reason.into(),
        })
    }
}

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No title with this id.
    #[error("Video not found: {id}")]
    NotFound {
        /// Requested id.
        id: String,
    },

    /// A field failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Transcode status change that the lifecycle does not allow.
    #[error("Illegal transcode transition for {id}: {from} -> {to}")]
    IllegalTransition {
        /// Title id.
        id: String,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// The backing store lock was poisoned by a panicking writer.
    #[error("Catalog store is unavailable")]
    StoreUnavailable,
}

/// Upload facade errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Object storage credentials are not configured.
    #[error(
        "Object storage not configured. Set AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_REGION, AWS_S3_BUCKET_NAME and AWS_CLOUDFRONT_DOMAIN to enable uploads"
    )]
    NotConfigured,

    /// A required request field was empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The file name could not be turned into an object key.
    #[error("Invalid file name: {0}")]
    InvalidFilename(String),

    /// The external signer refused to issue a URL.
    #[error("Failed to generate upload URL: {0}")]
    SigningFailed(String),
}

/// File system errors with path context.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Reading a file failed.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// Creating a directory failed.
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirFailed {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_not_found_display() {
        let err = Error::title_not_found("abc");
        assert_eq!(err.to_string(), "Video not found: abc");
    }

    #[test]
    fn test_invalid_field_display() {
        let err = Error::invalid_field("title", "must not be empty");
        assert_eq!(err.to_string(), "Invalid title: must not be empty");
    }

    #[test]
    fn test_upload_missing_field_display() {
        let err: Error = UploadError::MissingField("videoId").into();
        assert_eq!(err.to_string(), "Missing required field: videoId");
    }

    #[test]
    fn test_file_system_error_display() {
        let err = Error::FileSystem(FileSystemError::ReadFailed {
            path: PathBuf::from("/test/config.json"),
            reason: "permission denied".to_string(),
        });
        assert!(err.to_string().contains("/test/config.json"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
