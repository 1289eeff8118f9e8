//! Inference gateway for MILO.
//!
//! Defines the `InferenceGateway` contract the session manager talks to and
//! ships a Claude-backed implementation of it.

pub mod claude;

use async_trait::async_trait;
use milo_common::{Message, Role};

pub use claude::{ClaudeConfig, ClaudeInference};

/// Produces an assistant reply for a prompt and its bounded history.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// `history` holds the most recent turns, oldest first, and already
    /// ends with the user turn carrying `text`.
    async fn chat(&self, text: &str, history: &[HistoryMessage]) -> Result<String, AiError>;
}

/// One `{role, content}` pair of conversation context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Take the last `window` messages as inference context.
pub fn bounded_history(messages: &[Message], window: usize) -> Vec<HistoryMessage> {
    let start = messages.len().saturating_sub(window);
    messages[start..].iter().map(HistoryMessage::from).collect()
}

/// Inference failures. The `Display` text is shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API key not configured")]
    NotConfigured,
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Request timed out")]
    Timeout,
}
