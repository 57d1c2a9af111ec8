use async_trait::async_trait;

use crate::channels::traits::{Channel, ChannelMessage};

use super::TelegramChannel;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: &str, recipient: &str) -> anyhow::Result<()> {
        self.send_message(recipient, message)
            .await
            .map_err(|error| anyhow::anyhow!("Telegram sendMessage failed: {error}"))?;
        Ok(())
    }

    async fn send_tracked(&self, message: &str, recipient: &str) -> anyhow::Result<Option<String>> {
        let message_id = self
            .send_message(recipient, message)
            .await
            .map_err(|error| anyhow::anyhow!("Telegram sendMessage failed: {error}"))?;
        Ok(message_id.map(|id| id.to_string()))
    }

    async fn edit(&self, recipient: &str, message_id: &str, message: &str) -> anyhow::Result<()> {
        let message_id: i64 = message_id
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid Telegram message id: {message_id}"))?;
        self.edit_message_text(recipient, message_id, message)
            .await
            .map_err(|error| anyhow::anyhow!("Telegram editMessageText failed: {error}"))?;
        Ok(())
    }

    async fn listen(&self, tx: tokio::sync::mpsc::Sender<ChannelMessage>) -> anyhow::Result<()> {
        self.listen_updates(tx).await
    }

    async fn start_typing(&self, recipient: &str) -> anyhow::Result<()> {
        self.send_chat_action(recipient, "upload_photo").await
    }

    async fn health_check(&self) -> bool {
        self.health_probe().await
    }
}
