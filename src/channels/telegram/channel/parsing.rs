use crate::channels::traits::{ChannelMessage, ImageRef, MessagePayload};

use super::TelegramChannel;

impl TelegramChannel {
    /// Parse a Telegram update into a channel message.
    ///
    /// Returns `None` for updates this bot does not handle (edits, stickers,
    /// messages without a resolvable sender). Photo messages resolve to the
    /// largest entry of the `photo` array — the highest-fidelity
    /// representation Telegram has for the image.
    pub fn parse_update_message(&self, update: &serde_json::Value) -> Option<ChannelMessage> {
        let message = update.get("message")?;

        let chat_id = message
            .get("chat")
            .and_then(|chat| chat.get("id"))
            .and_then(serde_json::Value::as_i64)
            .map(|id| id.to_string())?;

        let from = message.get("from");
        let user_id = from
            .and_then(|f| f.get("id"))
            .and_then(serde_json::Value::as_i64)
            .map(|id| id.to_string());
        let username = from
            .and_then(|f| f.get("username"))
            .and_then(serde_json::Value::as_str);
        let sender = user_id.or_else(|| username.map(str::to_string))?;

        let payload = parse_payload(message)?;

        let message_id = message
            .get("message_id")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or_default();
        let update_id = update
            .get("update_id")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or_default();

        Some(ChannelMessage {
            id: format!("telegram_{chat_id}_{message_id}_{update_id}"),
            sender,
            recipient: chat_id,
            payload,
            channel: "telegram".to_string(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        })
    }
}

fn parse_payload(message: &serde_json::Value) -> Option<MessagePayload> {
    if let Some(image) = parse_best_photo(message) {
        return Some(MessagePayload::Photo(image));
    }
    message
        .get("text")
        .and_then(serde_json::Value::as_str)
        .map(|text| MessagePayload::Text(text.to_string()))
}

/// Telegram sends the `photo` array ordered by resolution, smallest first;
/// the last entry is the best available representation.
fn parse_best_photo(message: &serde_json::Value) -> Option<ImageRef> {
    let sizes = message.get("photo").and_then(serde_json::Value::as_array)?;
    let best = sizes.last()?;
    let file_id = best.get("file_id").and_then(serde_json::Value::as_str)?;
    let unique_id = best
        .get("file_unique_id")
        .and_then(serde_json::Value::as_str)?;
    Some(ImageRef {
        file_id: file_id.to_string(),
        unique_id: unique_id.to_string(),
    })
}
