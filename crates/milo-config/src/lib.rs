//! MILO settings: the `config.toml` schema, its loader and range checks.
//!
//! ```rust,no_run
//! let config = milo_config::load_config()?;
//! println!("{}", config.assistant.placeholder_title);
//! # Ok::<(), milo_common::ConfigError>(())
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::MiloConfig;

use std::path::Path;

use milo_common::ConfigError;

/// Platform config file, created on first run.
///
/// Values that fail validation are logged and kept; only a missing
/// platform directory, unreadable file or malformed TOML is an error.
pub fn load_config() -> Result<MiloConfig, ConfigError> {
    toml_loader::load_default()
}

/// A `--config` file. Validation behaves as in [`load_config`].
pub fn load_config_from(path: &Path) -> Result<MiloConfig, ConfigError> {
    toml_loader::load_from_path(path)
}

/// Effective settings as pretty JSON, for `milo --print-config`.
pub fn config_to_json(config: &MiloConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printed_config_shows_every_table() {
        let json = config_to_json(&MiloConfig::default());
        for table in ["assistant", "reveal", "voice", "panel", "storage", "logging"] {
            assert!(json.contains(&format!("\"{table}\"")), "missing {table}");
        }
    }

    #[test]
    fn one_bad_value_does_not_discard_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("milo.toml");
        std::fs::write(
            &path,
            "[voice]\nenabled = true\nrate = 9.0\n\n[assistant]\ncontext_window = 4\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert!(config.voice.enabled);
        assert_eq!(config.voice.rate, 9.0);
        assert_eq!(config.assistant.context_window, 4);
        assert!(matches!(
            validation::validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
