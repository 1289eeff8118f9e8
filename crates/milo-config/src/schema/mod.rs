//! `config.toml` layout. Every table and key is optional.

mod assistant;
mod logging;
mod panel;
mod reveal;
mod storage;
mod voice;

pub use assistant::*;
pub use logging::*;
pub use panel::*;
pub use reveal::*;
pub use storage::*;
pub use voice::*;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MiloConfig {
    pub assistant: AssistantConfig,
    pub reveal: RevealConfig,
    pub voice: VoiceConfig,
    pub panel: PanelConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
