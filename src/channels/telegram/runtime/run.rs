use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::channels::traits::{Channel, ChannelMessage, ImageSource};
use crate::ingest::IngestPipeline;
use crate::session::SessionStore;

use super::super::channel::TelegramChannel;
use super::dispatch::UserRouter;
use super::handler::HandlerContext;

const INBOUND_QUEUE_CAPACITY: usize = 100;

/// Run the Telegram channel via long polling until shutdown.
///
/// Wires the polling listener to a bounded inbound queue and dispatches each
/// event to its user's worker. Returns after Ctrl+C or when the listener
/// stops (e.g. the bot token is rejected).
///
/// # Errors
///
/// Currently only listener startup can fail; runtime listener errors are
/// logged and end the loop.
pub async fn run_telegram(
    channel: Arc<TelegramChannel>,
    sessions: SessionStore,
    pipeline: IngestPipeline,
) -> Result<()> {
    let channel_for_send: Arc<dyn Channel> = channel.clone();
    let source: Arc<dyn ImageSource> = channel;

    let (tx, mut inbound_rx) = mpsc::channel::<ChannelMessage>(INBOUND_QUEUE_CAPACITY);
    let listener_channel = Arc::clone(&channel_for_send);
    let listener = tokio::spawn(async move {
        if let Err(error) = listener_channel.listen(tx).await {
            tracing::error!("Telegram listener error: {error}");
        }
    });

    let ctx = Arc::new(HandlerContext {
        channel: channel_for_send,
        source,
        sessions,
        pipeline,
    });
    let mut router = UserRouter::new(ctx);

    tracing::info!("Telegram channel running... (polling, Ctrl+C to stop)");
    loop {
        tokio::select! {
            maybe_msg = inbound_rx.recv() => {
                let Some(msg) = maybe_msg else {
                    break;
                };
                router.route(msg).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                break;
            }
        }
    }

    listener.abort();
    Ok(())
}
