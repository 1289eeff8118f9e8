//! Conversation storage backend selection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where conversations are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// JSON file location. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the JSON store path, falling back to
    /// `<data_dir>/milo/conversations.json`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(explicit) => Some(explicit.clone()),
            None => Some(dirs::data_dir()?.join("milo").join("conversations.json")),
        }
    }
}
