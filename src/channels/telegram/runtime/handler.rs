use std::sync::Arc;

use crate::channels::traits::{Channel, ChannelMessage, ImageRef, ImageSource, MessagePayload};
use crate::error::IngestError;
use crate::ingest::IngestPipeline;
use crate::session::SessionStore;

use super::super::commands::{BotCommand, parse_command};

const WELCOME_TEXT: &str = "Hello! I file your photos into labeled folders.\n\
1. Set a label with /class <name>\n\
2. Send me photos to upload them under that label\n\
3. /status shows the active label, /help lists all commands";

const HELP_TEXT: &str = "Commands:\n\
/start - introduction\n\
/help - this message\n\
/class <name> - set the active label for uploads\n\
/status - show the active label\n\
Send a photo to upload it under the active label.";

const INVALID_LABEL_TEXT: &str = "Please provide a label name.\nExample: /class Shoes";

const NO_LABEL_TEXT: &str =
    "Please set a label first with /class <name>.\nExample: /class Shoes";

const UPLOAD_IN_PROGRESS_TEXT: &str = "Uploading image...";

const UPLOAD_FAILED_TEXT: &str = "Upload failed. Please try again.";

const UNSUPPORTED_TEXT: &str =
    "I can only process photos and commands.\nSend /help to see what I understand.";

/// Shared dependencies for processing one user's events.
pub(crate) struct HandlerContext {
    pub(crate) channel: Arc<dyn Channel>,
    pub(crate) source: Arc<dyn ImageSource>,
    pub(crate) sessions: SessionStore,
    pub(crate) pipeline: IngestPipeline,
}

/// Process one inbound event: commands mutate or read the session store,
/// photos run the ingestion pipeline. Every failure is converted into a
/// single user-visible reply here; nothing propagates past one event.
pub(crate) async fn process_message(ctx: &HandlerContext, msg: ChannelMessage) {
    match msg.payload {
        MessagePayload::Text(ref text) => {
            let reply = text_reply(ctx, &msg.sender, text).await;
            if let Err(error) = ctx.channel.send(&reply, &msg.recipient).await {
                tracing::error!(
                    event = "telegram.reply.failed",
                    sender = %msg.sender,
                    error = %error,
                    "failed to send command reply"
                );
            }
        }
        MessagePayload::Photo(ref image) => {
            handle_photo(ctx, &msg, image).await;
        }
    }
}

async fn text_reply(ctx: &HandlerContext, user_id: &str, text: &str) -> String {
    match parse_command(text) {
        Some(BotCommand::Start) => WELCOME_TEXT.to_string(),
        Some(BotCommand::Help) => HELP_TEXT.to_string(),
        Some(BotCommand::SetLabel(raw)) => match ctx.sessions.set_label(user_id, &raw).await {
            Ok(()) => {
                let label = raw.trim();
                format!("Label set to \"{label}\".\nNow send me photos to upload them under it!")
            }
            Err(_) => INVALID_LABEL_TEXT.to_string(),
        },
        Some(BotCommand::Status) => match ctx.sessions.get_label(user_id).await {
            Some(label) => format!("Active label: \"{label}\".\nReady to receive photos."),
            None => "No label set.\nUse /class <name> to set one first.".to_string(),
        },
        None => UNSUPPORTED_TEXT.to_string(),
    }
}

async fn handle_photo(ctx: &HandlerContext, msg: &ChannelMessage, image: &ImageRef) {
    // Precondition before any progress message: a label-less user gets the
    // prompt directly, not a progress message edited into one.
    if ctx.sessions.get_label(&msg.sender).await.is_none() {
        tracing::debug!(
            event = "ingest.no_active_label",
            sender = %msg.sender,
            unique_id = %image.unique_id,
            "photo received before any label was set"
        );
        if let Err(error) = ctx.channel.send(NO_LABEL_TEXT, &msg.recipient).await {
            tracing::error!(
                event = "telegram.reply.failed",
                sender = %msg.sender,
                error = %error,
                "failed to send set-a-label prompt"
            );
        }
        return;
    }

    if let Err(error) = ctx.channel.start_typing(&msg.recipient).await {
        tracing::debug!("Failed to send typing indicator: {error}");
    }

    // Progress message; edited in place once the outcome is known.
    let tracked = match ctx
        .channel
        .send_tracked(UPLOAD_IN_PROGRESS_TEXT, &msg.recipient)
        .await
    {
        Ok(tracked) => tracked,
        Err(error) => {
            tracing::warn!(
                event = "telegram.reply.failed",
                sender = %msg.sender,
                error = %error,
                "failed to send upload progress message"
            );
            None
        }
    };

    let reply = match ctx.pipeline.ingest(ctx.source.as_ref(), &msg.sender, image).await {
        Ok(key) => format!("Image uploaded successfully.\nPath: {key}"),
        Err(IngestError::NoActiveLabel) => NO_LABEL_TEXT.to_string(),
        Err(error) => {
            let error_kind = error.kind();
            let error_chain = format!("{:#}", anyhow::Error::new(error));
            tracing::error!(
                event = "ingest.failed",
                sender = %msg.sender,
                unique_id = %image.unique_id,
                error_kind,
                error = %error_chain,
                "image ingestion failed"
            );
            UPLOAD_FAILED_TEXT.to_string()
        }
    };

    deliver_outcome(ctx, &msg.recipient, tracked.as_deref(), &reply).await;
}

/// Edit the progress message when possible, falling back to a fresh send.
async fn deliver_outcome(
    ctx: &HandlerContext,
    recipient: &str,
    tracked: Option<&str>,
    reply: &str,
) {
    if let Some(message_id) = tracked {
        match ctx.channel.edit(recipient, message_id, reply).await {
            Ok(()) => return,
            Err(error) => {
                tracing::debug!("Failed to edit progress message, sending fresh reply: {error}");
            }
        }
    }
    if let Err(error) = ctx.channel.send(reply, recipient).await {
        tracing::error!(
            event = "telegram.reply.failed",
            error = %error,
            "failed to send upload outcome"
        );
    }
}
