//! The ingestion pipeline: one inbound image event → one durable object.

use std::path::PathBuf;
use std::sync::Arc;

use crate::channels::{ImageRef, ImageSource};
use crate::error::IngestError;
use crate::session::SessionStore;
use crate::storage::ObjectStorage;

use super::key::StorageKey;
use super::staging::StagedImage;

/// Turns one inbound image event into a durable, addressable object, or a
/// classified failure, with no leaked staging files on any outcome path.
///
/// All-or-nothing: either the object is stored under the derived key and the
/// key is returned, or no new object exists and a typed error is returned.
/// No step is retried; a failure is the terminal outcome of one call.
pub struct IngestPipeline {
    sessions: SessionStore,
    storage: Arc<dyn ObjectStorage>,
    staging_dir: PathBuf,
}

impl IngestPipeline {
    /// Create a pipeline staging into the system temp directory.
    #[must_use]
    pub fn new(sessions: SessionStore, storage: Arc<dyn ObjectStorage>) -> Self {
        Self::with_staging_dir(sessions, storage, std::env::temp_dir())
    }

    /// Create a pipeline staging into an explicit directory.
    #[must_use]
    pub fn with_staging_dir(
        sessions: SessionStore,
        storage: Arc<dyn ObjectStorage>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            sessions,
            storage,
            staging_dir,
        }
    }

    /// Ingest one image for `user_id`.
    ///
    /// Steps: resolve the active label, fetch the best-resolution bytes from
    /// the transport into a scoped temp file, derive the storage key, write
    /// to the storage backend, release the staging file, report.
    ///
    /// # Errors
    ///
    /// - [`IngestError::NoActiveLabel`] when the user never set a label; no
    ///   side effects have occurred.
    /// - [`IngestError::TransferFailed`] when fetching or staging the bytes
    ///   failed.
    /// - [`IngestError::StorageFailed`] when the backend write failed; the
    ///   staging file is still released.
    pub async fn ingest(
        &self,
        source: &dyn ImageSource,
        user_id: &str,
        image: &ImageRef,
    ) -> Result<StorageKey, IngestError> {
        let Some(label) = self.sessions.get_label(user_id).await else {
            tracing::debug!(
                event = "ingest.no_active_label",
                user_id,
                unique_id = %image.unique_id,
                "image received before any label was set"
            );
            return Err(IngestError::NoActiveLabel);
        };

        let bytes = source
            .fetch_image(image)
            .await
            .map_err(IngestError::TransferFailed)?;

        // Dropped on every exit path below, including cancellation.
        let staged = StagedImage::write(&self.staging_dir, &bytes)
            .await
            .map_err(|error| IngestError::TransferFailed(error.into()))?;

        let key = StorageKey::derive(user_id, &label, image);

        let payload = staged
            .read()
            .await
            .map_err(|error| IngestError::TransferFailed(error.into()))?;
        self.storage
            .put(key.as_str(), payload)
            .await
            .map_err(IngestError::StorageFailed)?;

        drop(staged);
        tracing::info!(
            event = "ingest.stored",
            user_id,
            label = %label,
            key = %key,
            size = bytes.len(),
            "image stored"
        );
        Ok(key)
    }
}
