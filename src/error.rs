//! Error types for the ingestion pipeline.
//!
//! Library modules use `thiserror` for explicit error enums; the channel and
//! runtime layers convert these into user-facing replies at the boundary of
//! one event's processing.

use thiserror::Error;

use crate::storage::StorageError;

/// Failure modes of one `ingest` call.
///
/// Each variant maps to a distinct user-facing message and a distinct
/// tracing event. A returned error is the terminal outcome of the call; the
/// pipeline never retries on its own.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The user has never set a label; precondition failure with no side
    /// effects. The caller should prompt the user to set one first.
    #[error("no active label for this user")]
    NoActiveLabel,

    /// The transport could not deliver image bytes, or local staging failed.
    #[error("image transfer failed: {0}")]
    TransferFailed(#[source] anyhow::Error),

    /// The storage backend rejected or failed the write.
    #[error("storage write failed: {0}")]
    StorageFailed(#[source] StorageError),
}

impl IngestError {
    /// Short classification tag for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoActiveLabel => "no_active_label",
            Self::TransferFailed(_) => "transfer_failed",
            Self::StorageFailed(_) => "storage_failed",
        }
    }
}
