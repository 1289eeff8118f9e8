use std::path::PathBuf;

/// Failure to produce a usable `config.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config file at {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("invalid config: {0}")]
    ParseError(String),

    #[error("config values rejected: {0}")]
    ValidationError(String),
}

/// Startup failures of the `milo` binary.
#[derive(Debug, thiserror::Error)]
pub enum MiloError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("conversation store unavailable: {0}")]
    Store(String),

    #[error("inference client unavailable: {0}")]
    Inference(String),
}
