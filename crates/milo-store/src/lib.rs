//! Conversation persistence for MILO.
//!
//! The session manager only sees the `PersistenceGateway` trait. Two
//! implementations ship here: an in-memory store (tests, `--store memory`)
//! and a JSON file store for durable history.

mod json;
mod memory;
mod state;
pub mod title;

use async_trait::async_trait;
use milo_common::{Conversation, ConversationId, Message, MessageId, Role};

pub use json::JsonFileStore;
pub use memory::InMemoryStore;

pub const DEFAULT_PLACEHOLDER_TITLE: &str = "New Chat";

/// Durable conversation/message store.
///
/// Deleting a conversation also deletes its messages.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// All conversations, most recently updated first.
    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>>;

    async fn get_conversation(&self, id: &ConversationId) -> StoreResult<Option<Conversation>>;

    /// Create a conversation; `None` uses the store's placeholder title.
    async fn create_conversation(&self, title: Option<&str>) -> StoreResult<Conversation>;

    async fn rename_conversation(&self, id: &ConversationId, title: &str) -> StoreResult<bool>;

    async fn delete_conversation(&self, id: &ConversationId) -> StoreResult<bool>;

    /// Derive and store a title from the conversation's first exchange.
    /// Returns `None` when there is nothing to title from.
    async fn auto_title(&self, id: &ConversationId) -> StoreResult<Option<Conversation>>;

    /// Messages of a conversation in insertion order.
    async fn list_messages(&self, conversation_id: &ConversationId) -> StoreResult<Vec<Message>>;

    /// Append a message and return the canonical stored record.
    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: Role,
        content: &str,
    ) -> StoreResult<Message>;

    async fn delete_message(&self, id: &MessageId) -> StoreResult<bool>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage data error: {0}")]
    InvalidData(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
