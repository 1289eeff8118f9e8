use milo_ai::AiError;
use milo_common::ConversationId;
use milo_store::StoreError;

/// Errors surfaced by session operations.
///
/// The `Display` text of every variant except `Busy` is what lands in the
/// session's user-visible `error` field.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("A reply is already being generated")]
    Busy,

    #[error("Failed to create conversation")]
    CreateConversation(#[source] StoreError),

    #[error("Failed to send message")]
    SendMessage(#[source] StoreError),

    #[error("Failed to save reply")]
    SaveReply(#[source] StoreError),

    #[error("Failed to load conversation")]
    LoadConversation(#[source] StoreError),

    #[error("Failed to delete conversation")]
    DeleteConversation(#[source] StoreError),

    #[error("Failed to rename conversation")]
    RenameConversation(#[source] StoreError),

    #[error("conversation not found: {0}")]
    NotFound(ConversationId),

    #[error(transparent)]
    Inference(#[from] AiError),
}

impl SessionError {
    /// Whether this error is reported through the session's `error` field.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SessionError::Busy)
    }
}
