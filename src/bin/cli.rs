//! Course Crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use course_crawler::{
    error::{AppError, Result},
    models::{Config, StorageBackend},
    pipeline, storage,
};

/// Course Crawler - University of Toronto Course Finder Crawler
#[derive(Parser, Debug)]
#[command(
    name = "course-crawler",
    version,
    about = "Crawls the UofT course finder into a searchable store"
)]
struct Cli {
    /// Path to storage directory containing config.toml and local records
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every course in the catalog into storage
    Update {
        /// Override the configured storage backend (memory, local, redis)
        #[arg(long, value_parser = parse_backend)]
        backend: Option<StorageBackend>,
    },

    /// Validate configuration file
    Validate,

    /// Show configuration and the last update summary
    Info,
}

fn parse_backend(s: &str) -> std::result::Result<StorageBackend, String> {
    match s.to_ascii_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "local" => Ok(StorageBackend::Local),
        "redis" => Ok(StorageBackend::Redis),
        other => Err(format!("unknown backend '{other}'")),
    }
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

    log::info!("Course crawler starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    let summary_path = cli.storage_dir.join("last_update.json");

    match cli.command {
        Command::Update { backend } => {
            if let Some(backend) = backend {
                config.storage.backend = backend;
            }
            config.validate()?;
            if config.storage.backend == StorageBackend::Memory {
                log::warn!("Memory storage selected; crawled courses are discarded on exit");
            }

            let sink = storage::open_sink(&config.storage, &cli.storage_dir).await?;
            let summary = pipeline::run_update(Arc::new(config), sink).await?;

            tokio::fs::create_dir_all(&cli.storage_dir).await?;
            let json = serde_json::to_string_pretty(&summary)?;
            tokio::fs::write(&summary_path, json).await?;
            log::info!("Summary saved to {}", summary_path.display());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("List URL: {}", config.catalog.list_url()?);
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Storage backend: {:?}", config.storage.backend);
            log::info!("Detail concurrency: {}", config.crawler.max_concurrent);

            match tokio::fs::read_to_string(&summary_path).await {
                Ok(content) => {
                    let summary: serde_json::Value = serde_json::from_str(&content)?;
                    for key in ["end_time", "discovered", "stored"] {
                        if let Some(value) = summary.get(key) {
                            log::info!("Last update {}: {}", key, value);
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::info!("No update has run yet.");
                }
                Err(e) => return Err(AppError::Io(e)),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
