//! snapsort CLI: Telegram photo ingestion bot.
//!
//! Reads its configuration from the environment (TELEGRAM_BOT_TOKEN,
//! AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_REGION, S3_BUCKET_NAME) and
//! long-polls the Telegram Bot API until Ctrl+C.
//!
//! Logging: set `RUST_LOG=snapsort=info` (or `warn`, `debug`) to see logs on stderr.

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use snapsort::channels::telegram::{TelegramChannel, run_telegram};
use snapsort::config::Settings;
use snapsort::ingest::IngestPipeline;
use snapsort::session::SessionStore;
use snapsort::storage::{ObjectStorage, S3Storage};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "snapsort=debug"
        } else {
            "snapsort=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut settings = Settings::from_env()?;
    if let Some(bucket) = cli.bucket {
        settings.bucket = bucket;
    }
    if let Some(region) = cli.region {
        settings.aws_region = region;
    }

    let channel = Arc::new(match settings.telegram_api_base.clone() {
        Some(base) => TelegramChannel::new_with_base_url(settings.bot_token.clone(), base),
        None => TelegramChannel::new(settings.bot_token.clone()),
    });

    let storage: Arc<dyn ObjectStorage> = Arc::new(S3Storage::new(
        settings.bucket.clone(),
        settings.aws_region.clone(),
        settings.aws_access_key_id.clone(),
        settings.aws_secret_access_key.clone(),
        settings.s3_endpoint.clone(),
    )?);

    let sessions = SessionStore::default();
    let pipeline = IngestPipeline::new(sessions.clone(), storage);

    tracing::info!(
        bucket = %settings.bucket,
        region = %settings.aws_region,
        "Starting snapsort"
    );
    run_telegram(channel, sessions, pipeline).await
}
