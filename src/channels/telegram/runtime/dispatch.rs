use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::channels::traits::ChannelMessage;

use super::handler::{HandlerContext, process_message};

const USER_QUEUE_CAPACITY: usize = 32;

/// Routes inbound events to one worker task per user identifier.
///
/// Events for the same user are processed in arrival order on that user's
/// queue; different users' events run concurrently. Worker state is never
/// evicted, matching the session store's unbounded-per-user characteristic.
pub(crate) struct UserRouter {
    ctx: Arc<HandlerContext>,
    workers: HashMap<String, mpsc::Sender<ChannelMessage>>,
}

impl UserRouter {
    pub(crate) fn new(ctx: Arc<HandlerContext>) -> Self {
        Self {
            ctx,
            workers: HashMap::new(),
        }
    }

    /// Enqueue one event on its user's worker, spawning the worker on first
    /// contact. Applies backpressure to the caller when a user's queue is
    /// full rather than reordering or dropping.
    pub(crate) async fn route(&mut self, msg: ChannelMessage) {
        let user_id = msg.sender.clone();
        let tx = match self.workers.get(&user_id) {
            Some(tx) => tx.clone(),
            None => self.spawn_worker(&user_id),
        };
        if let Err(send_error) = tx.send(msg).await {
            // Worker queues only close when a worker panicked; recover once.
            tracing::warn!(user_id = %user_id, "user worker queue closed; respawning");
            let tx = self.spawn_worker(&user_id);
            if tx.send(send_error.0).await.is_err() {
                tracing::error!(user_id = %user_id, "dropping event: user worker unavailable");
            }
        }
    }

    fn spawn_worker(&mut self, user_id: &str) -> mpsc::Sender<ChannelMessage> {
        let (tx, mut rx) = mpsc::channel::<ChannelMessage>(USER_QUEUE_CAPACITY);
        let ctx = Arc::clone(&self.ctx);
        let worker_user = user_id.to_string();
        tokio::spawn(async move {
            tracing::debug!(user_id = %worker_user, "user worker started");
            while let Some(msg) = rx.recv().await {
                process_message(&ctx, msg).await;
            }
            tracing::debug!(user_id = %worker_user, "user worker stopped");
        });
        self.workers.insert(user_id.to_string(), tx.clone());
        tx
    }
}
