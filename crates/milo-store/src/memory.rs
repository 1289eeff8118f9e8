use async_trait::async_trait;
use milo_common::{Conversation, ConversationId, Message, MessageId, Role};
use parking_lot::Mutex;

use crate::state::StoreState;
use crate::{PersistenceGateway, StoreResult, DEFAULT_PLACEHOLDER_TITLE};

/// Process-local conversation store. Contents vanish on exit.
///
/// The lock is never held across an await.
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    placeholder_title: String,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            placeholder_title: DEFAULT_PLACEHOLDER_TITLE.to_string(),
        }
    }

    pub fn with_placeholder_title(mut self, title: impl Into<String>) -> Self {
        self.placeholder_title = title.into();
        self
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryStore {
    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>> {
        Ok(self.state.lock().list_conversations())
    }

    async fn get_conversation(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        Ok(self.state.lock().get_conversation(id))
    }

    async fn create_conversation(&self, title: Option<&str>) -> StoreResult<Conversation> {
        let title = title.unwrap_or(&self.placeholder_title);
        Ok(self.state.lock().create_conversation(title))
    }

    async fn rename_conversation(&self, id: &ConversationId, title: &str) -> StoreResult<bool> {
        Ok(self.state.lock().rename_conversation(id, title))
    }

    async fn delete_conversation(&self, id: &ConversationId) -> StoreResult<bool> {
        Ok(self.state.lock().delete_conversation(id))
    }

    async fn auto_title(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        self.state.lock().auto_title(id, &self.placeholder_title)
    }

    async fn list_messages(&self, conversation_id: &ConversationId) -> StoreResult<Vec<Message>> {
        Ok(self.state.lock().list_messages(conversation_id))
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: Role,
        content: &str,
    ) -> StoreResult<Message> {
        self.state.lock().append_message(conversation_id, role, content)
    }

    async fn delete_message(&self, id: &MessageId) -> StoreResult<bool> {
        Ok(self.state.lock().delete_message(id))
    }
}
