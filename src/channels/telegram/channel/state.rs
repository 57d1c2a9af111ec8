use std::time::Duration;

use super::constants::{
    TELEGRAM_DEFAULT_API_BASE, TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS,
    TELEGRAM_HTTP_REQUEST_TIMEOUT_SECS,
};

/// Environment variable overriding the Bot API base URL (used by tests to
/// point at a local mock server).
pub(super) const TELEGRAM_API_BASE_ENV: &str = "SNAPSORT_TELEGRAM_API_BASE_URL";

/// Telegram channel — long-polls the Bot API for updates and relays photos
/// and commands to the ingestion runtime.
pub struct TelegramChannel {
    pub(super) bot_token: String,
    pub(super) api_base_url: String,
    pub(super) client: reqwest::Client,
}

impl TelegramChannel {
    /// Create a channel against the default Bot API base URL (or the
    /// `SNAPSORT_TELEGRAM_API_BASE_URL` override).
    #[must_use]
    pub fn new(bot_token: String) -> Self {
        Self::new_with_base_url(bot_token, Self::default_api_base_url())
    }

    /// Create a channel against an explicit Bot API base URL.
    #[must_use]
    pub fn new_with_base_url(bot_token: String, api_base_url: String) -> Self {
        Self {
            bot_token,
            api_base_url,
            client: build_telegram_http_client(),
        }
    }

    fn default_api_base_url() -> String {
        std::env::var(TELEGRAM_API_BASE_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| TELEGRAM_DEFAULT_API_BASE.to_string())
    }

    pub(super) fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token
        )
    }

    pub(super) fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token,
            file_path.trim_start_matches('/')
        )
    }
}

fn build_telegram_http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(TELEGRAM_HTTP_REQUEST_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Failed to build Telegram HTTP client with timeouts; falling back to default client"
            );
            reqwest::Client::new()
        }
    }
}
