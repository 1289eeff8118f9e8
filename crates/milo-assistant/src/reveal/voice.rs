use std::sync::Arc;

use milo_common::{Message, MessageId};
use milo_config::schema::VoiceConfig;
use tracing::debug;

use super::cache::RevealCache;

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub enabled: bool,
    pub voice: String,
    pub rate: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::from(&VoiceConfig::default())
    }
}

impl From<&VoiceConfig> for VoiceSettings {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            enabled: config.enabled,
            voice: config.voice.clone(),
            rate: config.rate,
        }
    }
}

/// Speech synthesis backend.
pub trait VoiceOutput: Send + Sync {
    /// Start speaking `text`. Must not block until speech ends.
    fn speak(&self, text: &str, settings: &VoiceSettings);
}

/// Speaks the newest assistant reply once.
///
/// Spoken ids are remembered in the shared `RevealCache`, which keeps only
/// the most recent ones. Nothing is recorded while voice is disabled.
pub struct VoiceTrigger {
    output: Arc<dyn VoiceOutput>,
    cache: Arc<RevealCache>,
    settings: VoiceSettings,
}

impl VoiceTrigger {
    pub fn new(output: Arc<dyn VoiceOutput>, cache: Arc<RevealCache>, settings: VoiceSettings) -> Self {
        Self {
            output,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
    }

    /// Look at the current message list and speak its newest assistant
    /// reply if it has not been spoken yet. Returns the spoken id.
    pub fn observe(&self, messages: &[Message]) -> Option<MessageId> {
        if !self.settings.enabled {
            return None;
        }
        let latest = messages.iter().rev().find(|m| m.is_assistant())?;
        if !self.cache.mark_spoken(&latest.id) {
            return None;
        }
        debug!(message = %latest.id, "speaking reply");
        self.output.speak(&latest.content, &self.settings);
        Some(latest.id.clone())
    }
}
