use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use crate::channels::traits::{ImageRef, ImageSource};

use super::TelegramChannel;

#[derive(Deserialize)]
struct GetFileResponse {
    #[serde(default)]
    ok: bool,
    result: Option<GetFileResult>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct GetFileResult {
    file_path: Option<String>,
}

impl TelegramChannel {
    /// Resolve a `file_id` to the server-side file path via `getFile`.
    async fn resolve_file_path(&self, file_id: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({ "file_id": file_id });
        let response = self
            .client
            .post(self.api_url("getFile"))
            .json(&body)
            .send()
            .await
            .context("Telegram getFile request failed")?;

        let status = response.status();
        let data: GetFileResponse = response
            .json()
            .await
            .context("Telegram getFile response was not JSON")?;

        if !status.is_success() || !data.ok {
            let description = data
                .description
                .as_deref()
                .unwrap_or("unknown Telegram API error");
            anyhow::bail!("Telegram getFile failed (status={status}): {description}");
        }

        data.result
            .and_then(|result| result.file_path)
            .context("Telegram getFile response missing result.file_path")
    }
}

#[async_trait]
impl ImageSource for TelegramChannel {
    /// Fetch the raw bytes of the referenced image: `getFile` to resolve the
    /// download path, then one download request. A single attempt each; a
    /// failure here is reported to the pipeline as a transfer failure.
    async fn fetch_image(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>> {
        let file_path = self.resolve_file_path(&image.file_id).await?;

        let response = self
            .client
            .get(self.file_url(&file_path))
            .send()
            .await
            .context("Telegram file download request failed")?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Telegram file download failed (status={status})");
        }

        let bytes = response
            .bytes()
            .await
            .context("Telegram file download body read failed")?;
        tracing::debug!(
            event = "telegram.image.fetched",
            unique_id = %image.unique_id,
            size = bytes.len(),
            "image bytes fetched"
        );
        Ok(bytes.to_vec())
    }
}
