use std::collections::HashSet;
use std::sync::Arc;

use milo_common::{Conversation, ConversationId, Event, EventBus};
use milo_store::PersistenceGateway;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Titles a conversation after its first exchange, off the send path.
///
/// Each conversation is titled at most once per process. Failures are
/// logged and never reach the session's `error` field.
#[derive(Clone)]
pub struct AutoTitler {
    store: Arc<dyn PersistenceGateway>,
    events: Arc<EventBus>,
    conversations: Arc<Mutex<Vec<Conversation>>>,
    titled: Arc<Mutex<HashSet<ConversationId>>>,
}

impl AutoTitler {
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        events: Arc<EventBus>,
        conversations: Arc<Mutex<Vec<Conversation>>>,
    ) -> Self {
        Self {
            store,
            events,
            conversations,
            titled: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Start titling `id` in the background.
    ///
    /// Returns `None` when the conversation was already handed to the titler.
    pub fn spawn(&self, id: ConversationId) -> Option<JoinHandle<()>> {
        if !self.titled.lock().insert(id.clone()) {
            debug!(conversation = %id, "conversation already titled");
            return None;
        }
        let titler = self.clone();
        Some(tokio::spawn(async move { titler.run(id).await }))
    }

    async fn run(&self, id: ConversationId) {
        let conversation = match self.store.auto_title(&id).await {
            Ok(Some(conversation)) => conversation,
            Ok(None) => {
                debug!(conversation = %id, "nothing to title from");
                return;
            }
            Err(e) => {
                warn!(conversation = %id, error = %e, "auto-title failed");
                return;
            }
        };

        info!(conversation = %id, title = %conversation.title, "conversation titled");
        match self.store.list_conversations().await {
            Ok(list) => *self.conversations.lock() = list,
            Err(e) => {
                warn!(error = %e, "failed to refresh conversation list after titling");
                let mut list = self.conversations.lock();
                if let Some(entry) = list.iter_mut().find(|c| c.id == conversation.id) {
                    *entry = conversation.clone();
                }
            }
        }

        self.events.publish(Event::ConversationRetitled {
            id,
            title: conversation.title,
        });
        self.events.publish(Event::ConversationsChanged);
    }
}
