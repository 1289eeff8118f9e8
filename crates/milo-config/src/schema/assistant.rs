//! Conversation session settings.

use serde::{Deserialize, Serialize};

/// Session manager and inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Number of most recent messages sent as history (valid range: 1-100).
    pub context_window: u32,
    /// Title given to a conversation before auto-titling renames it.
    pub placeholder_title: String,
    /// Client-side inference timeout. Unset means wait indefinitely.
    pub inference_timeout_secs: Option<u64>,
    pub system_prompt: String,
    pub model: String,
    /// Valid range: 64-32000.
    pub max_tokens: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            context_window: 10,
            placeholder_title: "New Chat".into(),
            inference_timeout_secs: None,
            system_prompt: "You are MILO, a productivity assistant embedded in a desktop app. \
                            Be concise and helpful. Use plain text."
                .into(),
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 1024,
        }
    }
}
