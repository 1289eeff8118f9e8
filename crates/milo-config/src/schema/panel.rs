//! Assistant panel behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Outside clicks within this window after expanding are ignored
    /// (valid range: 0-2000).
    pub outside_click_grace_ms: u64,
    pub start_expanded: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            outside_click_grace_ms: 150,
            start_expanded: false,
        }
    }
}
