//! Voice output configuration types.

use serde::{Deserialize, Serialize};

/// Spoken replies. Off unless the user opts in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
    /// Platform voice identifier; "default" uses the system voice.
    pub voice: String,
    /// Speech rate multiplier (valid range: 0.1-4.0).
    pub rate: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            voice: "default".into(),
            rate: 1.0,
        }
    }
}
