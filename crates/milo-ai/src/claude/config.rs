use std::fmt;
use std::time::Duration;

const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Connection settings for [`super::ClaudeInference`].
///
/// A missing key is allowed: the client still builds, and each chat call
/// fails with `AiError::NotConfigured` so the session can show it.
#[derive(Clone)]
pub struct ClaudeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system_prompt: Option<String>,
    /// Whole-request limit applied by the HTTP client.
    pub timeout: Option<Duration>,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            max_tokens: 1024,
            temperature: 0.7,
            system_prompt: None,
            timeout: None,
        }
    }
}

// Keeps the key out of logs.
impl fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_some() { "set" } else { "unset" };
        f.debug_struct("ClaudeConfig")
            .field("api_key", &key)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ClaudeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().with_api_key(Some(api_key.into()))
    }

    /// Key from `ANTHROPIC_API_KEY`; blank counts as unset.
    pub fn from_env() -> Self {
        Self::default().with_api_key(std::env::var(API_KEY_VAR).ok())
    }

    fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
