//! Reading `config.toml` into a [`MiloConfig`].

use std::io::ErrorKind;
use std::path::Path;

use milo_common::ConfigError;
use tracing::{debug, info, warn};

use super::paths::{create_default_config, default_config_path};
use crate::schema::MiloConfig;
use crate::validation;

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("cannot read {}: {e}", path.display())),
    })
}

/// Parse the TOML file at `path`; omitted keys take their defaults.
///
/// Out-of-range values are reported as a warning, not an error: MILO keeps
/// running with what the user wrote.
pub fn load_from_path(path: &Path) -> Result<MiloConfig, ConfigError> {
    let text = read_file(path)?;
    let config = toml::from_str::<MiloConfig>(&text)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    match validation::validate(&config) {
        Ok(()) => debug!(path = %path.display(), "config validated"),
        Err(e) => warn!(path = %path.display(), "suspicious config value: {e}"),
    }
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load `<config_dir>/milo/config.toml`, writing the commented template
/// there on first run.
pub fn load_default() -> Result<MiloConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            Ok(MiloConfig::default())
        }
        other => other,
    }
}
