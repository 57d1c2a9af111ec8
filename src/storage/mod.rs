//! Object storage backends.
//!
//! The pipeline only needs a single-object `put` with atomic visibility: the
//! object at a key is either absent/old or fully the new content. S3 gives
//! this for single PUT requests; no multi-step commit is implemented here.

mod s3;

pub use s3::S3Storage;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Error types for object storage writes.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status (auth, quota, ...).
    #[error("storage rejected write: status={status}, body={body}")]
    Rejected {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Response body, for diagnostics only.
        body: String,
    },
}

/// Write-only object storage capability consumed by the ingestion pipeline.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key`, overwriting any existing object.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the write did not complete; the object
    /// under `key` is then either absent or still the old content.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
}
