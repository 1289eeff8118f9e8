use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use milo_config::schema::StorageBackend;

/// MILO: a desktop productivity assistant, terminal edition.
#[derive(Parser, Debug)]
#[command(name = "milo", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override, e.g. `milo=debug`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Conversation store backend.
    #[arg(long, value_enum)]
    pub store: Option<StoreArg>,

    /// Speak replies aloud.
    #[arg(long)]
    pub voice: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreArg {
    Memory,
    Json,
}

impl From<StoreArg> for StorageBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Memory => StorageBackend::Memory,
            StoreArg::Json => StorageBackend::Json,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
