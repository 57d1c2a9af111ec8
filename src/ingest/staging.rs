//! Scoped temporary staging for fetched image bytes.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

const STAGING_PREFIX: &str = "snapsort-";

/// Temp-file holding area for image bytes between transport fetch and
/// storage write.
///
/// The file is removed when this value is dropped, which covers every exit
/// path of an ingest call: success, storage failure, and task cancellation.
pub(crate) struct StagedImage {
    file: NamedTempFile,
}

impl StagedImage {
    /// Stage `bytes` into a fresh temp file under `dir`.
    pub(crate) async fn write(dir: &Path, bytes: &[u8]) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".jpg")
            .tempfile_in(dir)?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(Self { file })
    }

    /// Read the staged bytes back for upload.
    pub(crate) async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.file.path()).await
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }
}
