//! Per-chat dispatch queues.
//!
//! Events from one chat must be applied to that chat's session in arrival
//! order; different chats may proceed concurrently. The first message for a
//! chat spawns a worker task that drains that chat's queue sequentially.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::error;

use crate::bot::context::BotContext;
use crate::handlers::message::handle_message;
use crate::telegram::Message;

pub type ChatQueueMap = Arc<Mutex<HashMap<i64, mpsc::UnboundedSender<Message>>>>;

pub fn new_chat_queues() -> ChatQueueMap {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Enqueues a message for sequential processing on its chat's worker.
pub async fn dispatch_message(queues: &ChatQueueMap, context: &Arc<BotContext>, message: Message) {
    let chat_id = message.chat.id;
    let sender = {
        let mut queues = queues.lock().await;
        if let Some(sender) = queues.get(&chat_id) {
            sender.clone()
        } else {
            let (sender, receiver) = mpsc::unbounded_channel();
            spawn_queue_worker(chat_id, receiver, Arc::clone(context));
            queues.insert(chat_id, sender.clone());
            sender
        }
    };

    if let Err(err) = sender.send(message) {
        // Worker died; replace the queue and re-send.
        let message = err.0;
        let (sender, receiver) = mpsc::unbounded_channel();
        spawn_queue_worker(chat_id, receiver, Arc::clone(context));
        {
            let mut queues = queues.lock().await;
            queues.insert(chat_id, sender.clone());
        }
        let _ = sender.send(message);
    }
}

fn spawn_queue_worker(
    chat_id: i64,
    mut receiver: mpsc::UnboundedReceiver<Message>,
    context: Arc<BotContext>,
) {
    tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            if let Err(err) = handle_message(context.as_ref(), message).await {
                error!("Message handling error for chat {chat_id}: {err}");
            }
        }
    });
}
