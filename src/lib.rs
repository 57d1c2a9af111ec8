//! Telegram photo ingestion bot.
//!
//! Users pick a label with `/class <name>`, then send photos; each photo is
//! fetched from Telegram and stored in S3 under `{user_id}/{label}/{id}.jpg`.
//! Per-user ordering is preserved while different users upload concurrently.

pub mod channels;
pub mod config;
pub mod error;
pub mod ingest;
pub mod session;
pub mod storage;

pub use channels::{Channel, ChannelMessage, ImageRef, ImageSource, MessagePayload};
pub use channels::telegram::{TelegramChannel, run_telegram};
pub use config::Settings;
pub use error::IngestError;
pub use ingest::{IngestPipeline, StorageKey};
pub use session::SessionStore;
pub use storage::{ObjectStorage, S3Storage, StorageError};
