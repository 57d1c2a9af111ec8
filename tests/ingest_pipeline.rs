#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use snapsort::{
    ImageRef, ImageSource, IngestError, IngestPipeline, ObjectStorage, SessionStore, StorageError,
};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

struct StubSource {
    bytes: Option<Vec<u8>>,
    fetch_calls: AtomicUsize,
}

impl StubSource {
    fn serving(bytes: &[u8]) -> Self {
        Self {
            bytes: Some(bytes.to_vec()),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            bytes: None,
            fetch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageSource for StubSource {
    async fn fetch_image(&self, _image: &ImageRef) -> anyhow::Result<Vec<u8>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.bytes {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(anyhow::anyhow!("file download failed (status=502)")),
        }
    }
}

#[derive(Default)]
struct RecordingStorage {
    puts: Mutex<Vec<(String, Vec<u8>)>>,
    reject: bool,
}

impl RecordingStorage {
    fn rejecting() -> Self {
        Self {
            puts: Mutex::new(Vec::new()),
            reject: true,
        }
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        if self.reject {
            return Err(StorageError::Rejected {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "InternalError".to_string(),
            });
        }
        self.puts.lock().await.push((key.to_string(), bytes));
        Ok(())
    }
}

fn image(unique_id: &str) -> ImageRef {
    ImageRef {
        file_id: format!("file-{unique_id}"),
        unique_id: unique_id.to_string(),
    }
}

#[tokio::test]
async fn photo_without_label_is_rejected_with_no_side_effects() {
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = IngestPipeline::new(sessions, storage.clone());
    let source = StubSource::serving(JPEG_BYTES);

    let result = pipeline.ingest(&source, "42", &image("abc123")).await;

    assert!(matches!(result, Err(IngestError::NoActiveLabel)));
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 0);
    assert!(storage.puts.lock().await.is_empty());
}

#[tokio::test]
async fn photo_is_stored_under_the_active_label() {
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = IngestPipeline::new(sessions.clone(), storage.clone());
    let source = StubSource::serving(JPEG_BYTES);

    sessions.set_label("42", "Shoes").await.unwrap();
    let key = pipeline.ingest(&source, "42", &image("abc123")).await.unwrap();

    assert_eq!(key.as_str(), "42/Shoes/abc123.jpg");
    let puts = storage.puts.lock().await;
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].0, "42/Shoes/abc123.jpg");
    assert_eq!(puts[0].1, JPEG_BYTES);
}

#[tokio::test]
async fn changing_the_label_moves_later_photos_to_the_new_prefix() {
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = IngestPipeline::new(sessions.clone(), storage.clone());
    let source = StubSource::serving(JPEG_BYTES);

    sessions.set_label("42", "Shoes").await.unwrap();
    pipeline.ingest(&source, "42", &image("first")).await.unwrap();
    sessions.set_label("42", "Bags").await.unwrap();
    pipeline.ingest(&source, "42", &image("second")).await.unwrap();

    let puts = storage.puts.lock().await;
    assert_eq!(puts[0].0, "42/Shoes/first.jpg");
    assert_eq!(puts[1].0, "42/Bags/second.jpg");
}

#[tokio::test]
async fn resending_the_same_photo_overwrites_the_same_key() {
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = IngestPipeline::new(sessions.clone(), storage.clone());
    let source = StubSource::serving(JPEG_BYTES);

    sessions.set_label("42", "Shoes").await.unwrap();
    pipeline.ingest(&source, "42", &image("abc123")).await.unwrap();
    pipeline.ingest(&source, "42", &image("abc123")).await.unwrap();

    let puts = storage.puts.lock().await;
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].0, puts[1].0);
}

#[tokio::test]
async fn fetch_failure_maps_to_transfer_failed() {
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = IngestPipeline::new(sessions.clone(), storage.clone());
    let source = StubSource::failing();

    sessions.set_label("42", "Shoes").await.unwrap();
    let result = pipeline.ingest(&source, "42", &image("abc123")).await;

    assert!(matches!(result, Err(IngestError::TransferFailed(_))));
    assert!(storage.puts.lock().await.is_empty());
}

#[tokio::test]
async fn storage_failure_is_reported_and_leaves_no_staged_files() {
    let staging = tempfile::tempdir().unwrap();
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::rejecting());
    let pipeline = IngestPipeline::with_staging_dir(
        sessions.clone(),
        storage,
        staging.path().to_path_buf(),
    );
    let source = StubSource::serving(JPEG_BYTES);

    sessions.set_label("42", "Shoes").await.unwrap();
    let result = pipeline.ingest(&source, "42", &image("abc123")).await;

    assert!(matches!(result, Err(IngestError::StorageFailed(_))));
    let leftovers = std::fs::read_dir(staging.path()).unwrap().count();
    assert_eq!(leftovers, 0, "staging directory should be empty after failure");
}

#[tokio::test]
async fn successful_ingest_leaves_no_staged_files() {
    let staging = tempfile::tempdir().unwrap();
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = IngestPipeline::with_staging_dir(
        sessions.clone(),
        storage,
        staging.path().to_path_buf(),
    );
    let source = StubSource::serving(JPEG_BYTES);

    sessions.set_label("42", "Shoes").await.unwrap();
    pipeline.ingest(&source, "42", &image("abc123")).await.unwrap();

    let leftovers = std::fs::read_dir(staging.path()).unwrap().count();
    assert_eq!(leftovers, 0, "staging directory should be empty after success");
}

#[tokio::test]
async fn concurrent_users_keep_independent_labels() {
    let sessions = SessionStore::new();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = Arc::new(IngestPipeline::new(sessions.clone(), storage.clone()));

    let mut handles = Vec::new();
    for user in 0..8 {
        let sessions = sessions.clone();
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            let user_id = format!("user-{user}");
            let label = format!("label-{user}");
            sessions.set_label(&user_id, &label).await.unwrap();
            let source = StubSource::serving(JPEG_BYTES);
            pipeline
                .ingest(&source, &user_id, &image(&format!("img-{user}")))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let puts = storage.puts.lock().await;
    assert_eq!(puts.len(), 8);
    for user in 0..8 {
        let expected = format!("user-{user}/label-{user}/img-{user}.jpg");
        assert!(
            puts.iter().any(|(key, _)| *key == expected),
            "missing key {expected}"
        );
    }
}
