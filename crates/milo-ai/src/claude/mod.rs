//! Anthropic Messages API adapter, non-streaming.

mod client;
mod config;

pub use client::ClaudeInference;
pub use config::ClaudeConfig;
