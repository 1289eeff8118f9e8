//! Messages API adapter behind [`InferenceGateway`].

use std::time::Duration;

use async_trait::async_trait;
use milo_common::Role;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::ClaudeConfig;
use crate::{AiError, HistoryMessage, InferenceGateway};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Error bodies are cut to this many characters before they reach the user.
const ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Turn<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

pub struct ClaudeInference {
    config: ClaudeConfig,
    http: reqwest::Client,
}

impl ClaudeInference {
    pub fn new(config: ClaudeConfig) -> Result<Self, AiError> {
        let builder = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT);
        let builder = match config.timeout {
            Some(limit) => builder.timeout(limit),
            None => builder,
        };
        let http = builder
            .build()
            .map_err(|e| AiError::NetworkError(format!("http client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// History already ends with the prompt when the session persisted it
    /// first; otherwise the prompt is appended as a final user turn.
    fn request<'a>(&'a self, text: &'a str, history: &'a [HistoryMessage]) -> ChatRequest<'a> {
        let mut messages: Vec<Turn<'a>> = history
            .iter()
            .map(|m| Turn {
                role: m.role,
                content: &m.content,
            })
            .collect();
        let prompt_included = matches!(
            messages.last(),
            Some(Turn { role: Role::User, content }) if *content == text
        );
        if !prompt_included {
            messages.push(Turn {
                role: Role::User,
                content: text,
            });
        }
        ChatRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: self.config.system_prompt.as_deref(),
            messages,
        }
    }
}

fn first_text(response: ChatResponse) -> Result<String, AiError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .ok_or_else(|| AiError::ParseError("reply had no text".into()))
}

fn transport_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl InferenceGateway for ClaudeInference {
    async fn chat(&self, text: &str, history: &[HistoryMessage]) -> Result<String, AiError> {
        let Some(key) = self.config.api_key.as_deref() else {
            return Err(AiError::NotConfigured);
        };
        let body = self.request(text, history);
        debug!(model = body.model, turns = body.messages.len(), "sending chat request");

        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(AiError::RateLimited),
            status if status.is_success() => {
                let parsed = response
                    .json::<ChatResponse>()
                    .await
                    .map_err(|e| AiError::ParseError(e.to_string()))?;
                first_text(parsed)
            }
            status => {
                let detail: String = response
                    .text()
                    .await
                    .unwrap_or_default()
                    .chars()
                    .take(ERROR_BODY_CHARS)
                    .collect();
                warn!(%status, "chat request rejected");
                Err(AiError::ApiError(format!("HTTP {status}: {detail}")))
            }
        }
    }
}
