mod cli;
mod repl;
mod voice;

use std::process::ExitCode;
use std::sync::Arc;

use milo_ai::{ClaudeConfig, ClaudeInference};
use milo_assistant::AssistantContext;
use milo_common::{ConfigError, MiloError};
use milo_config::schema::{MiloConfig, StorageBackend};
use milo_store::{InMemoryStore, JsonFileStore, PersistenceGateway};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn load_config(args: &cli::Args) -> (MiloConfig, Option<ConfigError>) {
    let loaded = match &args.config {
        Some(path) => milo_config::load_config_from(path),
        None => milo_config::load_config(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (MiloConfig::default(), Some(e)),
    }
}

fn init_logging(args: &cli::Args, config: &MiloConfig) {
    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| format!("milo={}", config.logging.level.as_directive()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            ),
        )
        .init();
}

async fn open_store(
    config: &MiloConfig,
    backend: StorageBackend,
) -> milo_common::Result<Arc<dyn PersistenceGateway>> {
    let title = config.assistant.placeholder_title.clone();
    let path = match backend {
        StorageBackend::Memory => None,
        StorageBackend::Json => config.storage.resolved_path(),
    };
    let Some(path) = path else {
        if backend == StorageBackend::Json {
            tracing::warn!("No data directory available, falling back to in-memory store");
        }
        tracing::info!("Using in-memory conversation store");
        return Ok(Arc::new(InMemoryStore::new().with_placeholder_title(title)));
    };

    let store = JsonFileStore::open(&path)
        .await
        .map_err(|e| MiloError::Store(format!("{}: {e}", path.display())))?;
    tracing::info!("Conversations stored at {}", path.display());
    Ok(Arc::new(store.with_placeholder_title(title)))
}

fn claude_config(config: &MiloConfig) -> ClaudeConfig {
    let assistant = &config.assistant;
    let mut claude = ClaudeConfig::from_env()
        .with_model(&assistant.model)
        .with_max_tokens(assistant.max_tokens);
    if !assistant.system_prompt.trim().is_empty() {
        claude = claude.with_system_prompt(&assistant.system_prompt);
    }
    claude
}

async fn run(args: cli::Args) -> milo_common::Result<()> {
    let (mut config, config_error) = load_config(&args);
    init_logging(&args, &config);

    tracing::info!("MILO v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }
    if args.voice {
        config.voice.enabled = true;
    }
    if args.print_config {
        println!("{}", milo_config::config_to_json(&config));
        return Ok(());
    }

    let backend = args.store.map(Into::into).unwrap_or(config.storage.backend);
    let store = open_store(&config, backend).await?;

    let claude = claude_config(&config);
    if !claude.is_configured() {
        tracing::warn!("ANTHROPIC_API_KEY is not set; replies will fail until it is");
    }
    let inference =
        ClaudeInference::new(claude).map_err(|e| MiloError::Inference(e.to_string()))?;
    tracing::info!("Using model {}", inference.model());

    let ctx = AssistantContext::new(&config, store, Arc::new(inference), Arc::new(voice::CommandVoice));
    repl::run(ctx).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
