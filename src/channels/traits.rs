//! Channel trait and message types for chat platforms.

use async_trait::async_trait;

/// Reference to an image held by the transport.
///
/// `file_id` is the handle used to fetch bytes; `unique_id` is the
/// transport-provided stable identifier for the image content, used to derive
/// the storage key. Re-sending the same image yields the same `unique_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Fetch handle for the highest-resolution representation.
    pub file_id: String,
    /// Stable unique identifier for this image.
    pub unique_id: String,
}

/// Payload of one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    /// Plain text (commands included; parsed downstream).
    Text(String),
    /// An image, already resolved to its best available representation.
    Photo(ImageRef),
}

/// A message received from a channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    /// Unique message ID (e.g. `telegram_{chat_id}_{message_id}_{update_id}`).
    pub id: String,
    /// Sender identifier; the session key for per-user state.
    pub sender: String,
    /// Reply target for channel send operations (for Telegram, the chat_id).
    pub recipient: String,
    /// Text or image payload.
    pub payload: MessagePayload,
    /// Channel name (e.g. `telegram`).
    pub channel: String,
    /// Unix timestamp.
    pub timestamp: u64,
}

/// Core channel trait — implement for any messaging platform.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Send a text reply through this channel.
    async fn send(&self, message: &str, recipient: &str) -> anyhow::Result<()>;

    /// Send a text reply and return a handle for editing it later.
    ///
    /// Returns `None` when the platform cannot edit sent messages; callers
    /// fall back to sending a fresh message.
    async fn send_tracked(&self, message: &str, recipient: &str) -> anyhow::Result<Option<String>> {
        self.send(message, recipient).await?;
        Ok(None)
    }

    /// Replace the text of a previously sent message.
    async fn edit(&self, _recipient: &str, _message_id: &str, _message: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(
            "message editing is not supported for this channel"
        ))
    }

    /// Start listening for incoming messages (long-running).
    async fn listen(&self, tx: tokio::sync::mpsc::Sender<ChannelMessage>) -> anyhow::Result<()>;

    /// Signal that the bot is processing a response (e.g. "typing" indicator).
    async fn start_typing(&self, _recipient: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// Check if channel is healthy.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Narrow image-fetch capability the ingestion pipeline consumes.
///
/// Implementations must deliver the highest-fidelity representation the
/// transport has for the referenced image.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch the raw bytes of the referenced image.
    async fn fetch_image(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>>;
}
