use super::TelegramChannel;
use super::constants::TELEGRAM_SEND_MAX_RETRIES;
use super::error::{
    TelegramApiError, telegram_api_error_code, telegram_api_error_description,
    telegram_api_error_retry_after_secs,
};

impl TelegramChannel {
    /// Send a plain-text message; returns the Telegram `message_id` so the
    /// message can be edited later (progress → final status). `None` when the
    /// response carries no id; callers then fall back to a fresh send instead
    /// of attempting an edit that cannot succeed.
    pub(super) async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<Option<i64>, TelegramApiError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        let result = self
            .send_api_request_with_retry("sendMessage", &body)
            .await?;
        Ok(result
            .get("message_id")
            .and_then(serde_json::Value::as_i64))
    }

    /// Replace the text of a previously sent message.
    pub(super) async fn edit_message_text(
        &self,
        chat_id: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramApiError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        self.send_api_request_with_retry("editMessageText", &body)
            .await?;
        Ok(())
    }

    pub(super) async fn send_chat_action(
        &self,
        chat_id: &str,
        action: &str,
    ) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": action,
        });
        self.send_api_request_once("sendChatAction", &body)
            .await
            .map_err(|error| anyhow::anyhow!("Telegram sendChatAction failed: {error}"))?;
        Ok(())
    }

    /// Issue a Bot API call, retrying transient failures (429/timeouts/5xx) a
    /// bounded number of times. Returns the `result` field of the response.
    async fn send_api_request_with_retry(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TelegramApiError> {
        for attempt in 0..=TELEGRAM_SEND_MAX_RETRIES {
            match self.send_api_request_once(method, body).await {
                Ok(result) => return Ok(result),
                Err(error) if attempt < TELEGRAM_SEND_MAX_RETRIES && error.should_retry_send() => {
                    let delay = error.retry_delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = TELEGRAM_SEND_MAX_RETRIES,
                        delay_ms = delay.as_millis(),
                        method,
                        error = %error,
                        "Telegram API transient failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }

        unreachable!("send_api_request_with_retry should return before exhausting attempts")
    }

    async fn send_api_request_once(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TelegramApiError> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(TelegramApiError::from_reqwest)?;
        Self::validate_telegram_response(response).await
    }

    /// Turn a Bot API HTTP response into its `result` payload or a
    /// [`TelegramApiError`] carrying status, API error code and retry hint.
    async fn validate_telegram_response(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, TelegramApiError> {
        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();
        let data = serde_json::from_str::<serde_json::Value>(&body_text).ok();

        let ok = status.is_success()
            && data
                .as_ref()
                .and_then(|d| d.get("ok"))
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
        if ok {
            let result = data
                .as_ref()
                .and_then(|d| d.get("result"))
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            return Ok(result);
        }

        let (error_code, retry_after_secs, description) = match data.as_ref() {
            Some(data) => (
                telegram_api_error_code(data),
                telegram_api_error_retry_after_secs(data),
                telegram_api_error_description(data, body_text.as_str()).to_string(),
            ),
            None => (None, None, body_text),
        };
        Err(TelegramApiError {
            status: Some(status),
            error_code,
            retry_after_secs,
            body: description,
        })
    }
}
