//! Synchronous store state shared by the in-memory and JSON stores.

use chrono::{DateTime, Utc};
use milo_common::{Conversation, ConversationId, Message, MessageId, Role};
use serde::{Deserialize, Serialize};

use crate::title::derive_title;
use crate::{StoreError, StoreResult};

/// Every conversation and message, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    pub conversations: Vec<Conversation>,
    pub messages: Vec<Message>,
}

impl StoreState {
    pub fn list_conversations(&self) -> Vec<Conversation> {
        let mut list = self.conversations.clone();
        // Newest first when timestamps tie.
        list.reverse();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    pub fn get_conversation(&self, id: &ConversationId) -> Option<Conversation> {
        self.conversations.iter().find(|c| &c.id == id).cloned()
    }

    pub fn create_conversation(&mut self, title: &str) -> Conversation {
        let now = Utc::now();
        let conversation = Conversation {
            id: ConversationId::new(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.conversations.push(conversation.clone());
        conversation
    }

    pub fn rename_conversation(&mut self, id: &ConversationId, title: &str) -> bool {
        match self.conversations.iter_mut().find(|c| &c.id == id) {
            Some(c) => {
                c.title = title.to_string();
                c.updated_at = Utc::now().max(c.updated_at);
                true
            }
            None => false,
        }
    }

    pub fn delete_conversation(&mut self, id: &ConversationId) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| &c.id != id);
        if self.conversations.len() == before {
            return false;
        }
        self.messages.retain(|m| &m.conversation_id != id);
        true
    }

    pub fn list_messages(&self, conversation_id: &ConversationId) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    pub fn append_message(
        &mut self,
        conversation_id: &ConversationId,
        role: Role,
        content: &str,
    ) -> StoreResult<Message> {
        let last = self.last_timestamp(conversation_id);
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| &c.id == conversation_id)
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.clone()))?;

        // Clock steps backwards must not reorder a conversation.
        let created_at = last.map_or_else(Utc::now, |t| Utc::now().max(t));
        conversation.updated_at = created_at.max(conversation.updated_at);

        let message = Message {
            id: MessageId::new(),
            conversation_id: conversation_id.clone(),
            role,
            content: content.to_string(),
            created_at,
        };
        self.messages.push(message.clone());
        Ok(message)
    }

    pub fn delete_message(&mut self, id: &MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| &m.id != id);
        self.messages.len() != before
    }

    pub fn auto_title(
        &mut self,
        id: &ConversationId,
        placeholder: &str,
    ) -> StoreResult<Option<Conversation>> {
        if self.get_conversation(id).is_none() {
            return Err(StoreError::ConversationNotFound(id.clone()));
        }
        let Some(first) = self
            .messages
            .iter()
            .find(|m| &m.conversation_id == id && m.role == Role::User)
        else {
            return Ok(None);
        };

        let title = derive_title(&first.content, placeholder);
        self.rename_conversation(id, &title);
        Ok(self.get_conversation(id))
    }

    fn last_timestamp(&self, conversation_id: &ConversationId) -> Option<DateTime<Utc>> {
        self.messages
            .iter()
            .rev()
            .find(|m| &m.conversation_id == conversation_id)
            .map(|m| m.created_at)
    }
}
