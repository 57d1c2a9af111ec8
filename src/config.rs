//! Runtime settings loader.
//!
//! All configuration comes from the process environment. Required variables
//! are validated up front so a misconfigured deployment fails at startup with
//! one message naming everything that is missing, instead of dying on the
//! first upload.

use thiserror::Error;

/// Required environment variables, in reporting order.
const REQUIRED_VARS: [&str; 4] = [
    "TELEGRAM_BOT_TOKEN",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "S3_BUCKET_NAME",
];

const DEFAULT_AWS_REGION: &str = "ap-south-1";

/// Override base URL for the Telegram Bot API (tests point this at a mock).
pub const TELEGRAM_API_BASE_ENV: &str = "SNAPSORT_TELEGRAM_API_BASE_URL";
/// Override endpoint for S3 (tests point this at a mock).
pub const S3_ENDPOINT_ENV: &str = "SNAPSORT_S3_ENDPOINT_URL";

/// Settings resolution failure.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// One or more required environment variables are unset or empty.
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVars(Vec<String>),
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Telegram bot token.
    pub bot_token: String,
    /// AWS access key ID for S3 request signing.
    pub aws_access_key_id: String,
    /// AWS secret access key for S3 request signing.
    pub aws_secret_access_key: String,
    /// AWS region the bucket lives in.
    pub aws_region: String,
    /// Target S3 bucket.
    pub bucket: String,
    /// Optional Telegram Bot API base URL override.
    pub telegram_api_base: Option<String>,
    /// Optional S3 endpoint override.
    pub s3_endpoint: Option<String>,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingVars`] listing every required variable
    /// that is unset or blank.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through a lookup function (seam for tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|name| get(name).is_none())
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SettingsError::MissingVars(missing));
        }

        // Required vars validated above.
        let require = |name: &str| get(name).unwrap_or_default();

        Ok(Self {
            bot_token: require("TELEGRAM_BOT_TOKEN"),
            aws_access_key_id: require("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY"),
            aws_region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            bucket: require("S3_BUCKET_NAME"),
            telegram_api_base: get(TELEGRAM_API_BASE_ENV),
            s3_endpoint: get(S3_ENDPOINT_ENV),
        })
    }
}
