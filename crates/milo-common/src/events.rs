//! Session notifications fanned out to the reveal engine, the panel and the
//! terminal renderer.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::id::{ConversationId, MessageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// The history list was reloaded or reordered.
    ConversationsChanged,
    ConversationOpened(ConversationId),
    /// No conversation is current any more.
    ConversationClosed,
    ConversationDeleted(ConversationId),
    ConversationRetitled { id: ConversationId, title: String },
    MessageAppended(MessageId),
    GeneratingChanged(bool),
    ErrorChanged(Option<String>),
}

/// Broadcast bus. Slow receivers lag and skip; senders never block.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns how many receivers saw the event.
    pub fn publish(&self, event: Event) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(dropped)) => {
                tracing::trace!(event = ?dropped, "no subscribers");
                0
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
