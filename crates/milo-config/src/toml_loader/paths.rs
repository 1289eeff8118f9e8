//! Where MILO keeps its config file, and first-run creation of it.

use std::path::{Path, PathBuf};

use milo_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

const APP_DIR: &str = "milo";
const CONFIG_FILE: &str = "config.toml";

/// `<config_dir>/milo/config.toml` for the current platform.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| ConfigError::ParseError("no config directory on this platform".into()))
}

/// Write the commented template to `path`. An existing file is left alone.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }
    let io_err = |what: &str, at: &Path, e: std::io::Error| {
        ConfigError::ParseError(format!("{what} {}: {e}", at.display()))
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err("cannot create", dir, e))?;
    }
    std::fs::write(path, default_config_toml()).map_err(|e| io_err("cannot write", path, e))?;

    info!(path = %path.display(), "wrote default MILO config");
    Ok(())
}
