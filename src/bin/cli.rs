//! pagehoard CLI
//!
//! Long-running watcher entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pagehoard::{
    config::Config,
    error::Result,
    notify::{Broadcaster, TelegramNotifier},
    pipeline::Watcher,
    storage::{ArtifactStore, HistoryStore, LocalArtifacts, catalog},
    utils::http,
};

/// pagehoard - Page change watcher and file hoarder
#[derive(Parser, Debug)]
#[command(
    name = "pagehoard",
    version,
    about = "Watches web pages for changes and hoards newly published files"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the catalog until interrupted
    Watch,

    /// Validate configuration and catalog files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Starting program.");

    let config = Arc::new(Config::load_or_default(&cli.config));
    config.validate()?;

    match cli.command {
        Command::Watch => watch(config).await?,
        Command::Validate => validate(&config)?,
    }

    log::info!("Stopping program.");

    Ok(())
}

/// Wire up the collaborators and run the watch loop until an interrupt
/// or an unrecoverable error ends it; both paths attempt one final
/// owner notification.
async fn watch(config: Arc<Config>) -> Result<()> {
    let mut pages = catalog::load_catalog(&config.storage)?;
    log::info!(
        "Loaded {} pages with {} sections",
        pages.len(),
        pages.iter().map(|p| p.sections.len()).sum::<usize>()
    );

    let history = HistoryStore::open(&config.storage.database_path)?;
    let artifacts: Arc<dyn ArtifactStore> =
        Arc::new(LocalArtifacts::new(&config.storage.artifact_root));

    let mut broadcaster = Broadcaster::new();
    let client = http::create_client(&config.watcher)?;
    match TelegramNotifier::from_env(&client) {
        Some(telegram) => broadcaster.register(Box::new(telegram)),
        None => log::warn!("TELEGRAM_BOT_TOKEN not configured; notifications are disabled."),
    }
    let broadcaster = Arc::new(broadcaster);

    let watcher = Watcher::new(
        Arc::clone(&config),
        history,
        artifacts,
        Arc::clone(&broadcaster),
    )?;

    tokio::select! {
        result = watcher.run(&mut pages) => {
            if let Err(e) = result {
                log::error!("Unexpected error occured: {e}");
                broadcaster
                    .to_owner(&format!("Something went very wrong!\n\n{e}"))
                    .await;
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interruption signal caught.");
            broadcaster.to_owner("Interruption signal caught.").await;
        }
    }

    Ok(())
}

/// Report the validated configuration and catalog.
fn validate(config: &Config) -> Result<()> {
    log::info!("Config OK");

    let pages = catalog::load_catalog(&config.storage)?;
    for page in &pages {
        log::info!("Page {}: {} sections", page.name, page.sections.len());
    }
    log::info!("All validations passed!");
    Ok(())
}
