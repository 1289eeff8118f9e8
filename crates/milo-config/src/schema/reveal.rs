//! Typewriter reveal pacing.

use serde::{Deserialize, Serialize};

/// Inter-character timing for the incremental reveal of assistant replies.
///
/// All values are milliseconds except `progress_every` (characters) and
/// `voice_cache_capacity` (entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    /// Pause after `.`, `!` or `?`.
    pub sentence_pause_ms: u64,
    pub comma_pause_ms: u64,
    pub newline_pause_ms: u64,
    pub char_pause_min_ms: u64,
    pub char_pause_max_ms: u64,
    pub progress_every: u32,
    pub voice_cache_capacity: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 100,
            sentence_pause_ms: 80,
            comma_pause_ms: 40,
            newline_pause_ms: 60,
            char_pause_min_ms: 15,
            char_pause_max_ms: 30,
            progress_every: 5,
            voice_cache_capacity: 100,
        }
    }
}
