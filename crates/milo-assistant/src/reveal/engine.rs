use std::sync::Arc;

use milo_common::Message;
use milo_config::schema::RevealConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::cache::RevealCache;
use super::pacing::RevealPacing;
use super::typewriter::Typewriter;

/// How a message is shown when it is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// Full text at once, no cursor.
    Settled,
    /// Character by character with a trailing cursor.
    Animate,
}

/// Decides which message animates and hands out typewriters for it.
pub struct RevealEngine {
    cache: Arc<RevealCache>,
    pacing: RevealPacing,
    enabled: bool,
    seed: Option<u64>,
}

impl RevealEngine {
    pub fn new(cache: Arc<RevealCache>, config: &RevealConfig) -> Self {
        Self {
            cache,
            pacing: RevealPacing::from(config),
            enabled: config.enabled,
            seed: None,
        }
    }

    pub fn with_pacing(mut self, pacing: RevealPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Use a fixed seed for the per-character jitter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn cache(&self) -> &Arc<RevealCache> {
        &self.cache
    }

    pub fn pacing(&self) -> &RevealPacing {
        &self.pacing
    }

    /// Phase of `messages[index]` as of now.
    ///
    /// Only the newest message animates, only if it is an assistant reply,
    /// and only if it has never been animated before.
    pub fn phase(&self, messages: &[Message], index: usize) -> RevealPhase {
        let Some(message) = messages.get(index) else {
            return RevealPhase::Settled;
        };
        let is_last = index + 1 == messages.len();
        if self.enabled && is_last && message.is_assistant() && !self.cache.is_animated(&message.id)
        {
            RevealPhase::Animate
        } else {
            RevealPhase::Settled
        }
    }

    /// Mount `messages[index]`. Returns a typewriter when it should
    /// animate, `None` when the full text should be shown.
    pub fn mount(&self, messages: &[Message], index: usize) -> Option<Typewriter> {
        if self.phase(messages, index) == RevealPhase::Settled {
            return None;
        }
        let message = messages.get(index)?;
        debug!(message = %message.id, "animating reply");
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Some(Typewriter::new(
            message,
            self.pacing.clone(),
            self.cache.clone(),
            rng,
        ))
    }

    /// Mount the newest message of `messages`.
    pub fn mount_latest(&self, messages: &[Message]) -> Option<Typewriter> {
        self.mount(messages, messages.len().checked_sub(1)?)
    }
}
