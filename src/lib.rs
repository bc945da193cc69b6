pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod library;
pub mod models;
pub mod naming;
pub mod parser;
pub mod services;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cli::Cli;
use clients::TvMazeClient;
pub use config::Config;
pub use error::Error;
use services::{RenameService, StdinPrompt};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    cli.apply_to(&mut config);

    init_tracing(&config, cli.log_file.as_deref())?;
    config.validate()?;

    if let Some(path) = &cli.save {
        config.save_to_path(path)?;
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    if cli.dump_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No files or directories given, see --help");
    }

    let provider = Arc::new(
        TvMazeClient::new(&config.metadata).context("Failed to create metadata client")?,
    );
    let service = RenameService::new(&config, provider)?;

    info!(
        batch = config.general.batch,
        dry_run = config.general.dry_run,
        moving = config.relocation.enable,
        "Starting"
    );

    let summary = service.process_all(&cli.paths, &mut StdinPrompt).await?;
    summary.print();

    if summary.has_failures() {
        anyhow::bail!("{} file(s) could not be renamed", summary.failures.len());
    }

    Ok(())
}

fn init_tracing(config: &Config, log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialise logging")
}
