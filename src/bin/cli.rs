//! Heroes CLI
//!
//! Command-line front end for the heroes data-access service and the
//! type-ahead search pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use heroes::{
    error::Result,
    models::{Config, HeroId, NewHero},
    notify::MessageLog,
    search::SearchPipeline,
    services::HeroService,
    transport::{HttpTransport, MemoryTransport, Transport},
    utils::report,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Heroes - REST client for the heroes collection
#[derive(Parser, Debug)]
#[command(name = "heroes", version, about = "Browse and edit the heroes collection")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Use a seeded in-process backend instead of HTTP
    #[arg(long)]
    memory: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every hero
    List,

    /// Show the top heroes
    Dashboard,

    /// Look up a hero by id
    Get {
        id: HeroId,

        /// Treat a missing hero as an empty match instead of a failure
        #[arg(long)]
        lenient: bool,
    },

    /// Find heroes whose name contains the term
    Search { term: String },

    /// Create a hero
    Add { name: String },

    /// Rename an existing hero
    Rename { id: HeroId, name: String },

    /// Delete a hero
    Delete { id: HeroId },

    /// Read search terms from stdin, one per line, and print live results
    Watch,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging with the given default filter.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
        Config::default()
    });

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK ({})", config.api.base_url);
        return Ok(());
    }

    let transport: Arc<dyn Transport> = if cli.memory {
        log::info!("Using in-memory backend");
        Arc::new(MemoryTransport::seeded().with_collection(&config.api.collection))
    } else {
        log::info!("Using backend at {}", config.api.base_url);
        Arc::new(HttpTransport::new(&config.api)?)
    };
    let messages = Arc::new(MessageLog::new());
    let service = Arc::new(
        HeroService::new(transport, messages.clone()).with_collection(&config.api.collection),
    );

    match cli.command {
        Command::List => {
            let heroes = service.list_all().await;
            report::heroes("My Heroes", &heroes);
        }

        Command::Dashboard => {
            let heroes = service.list_all().await;
            let top: Vec<_> = heroes.into_iter().skip(1).take(4).collect();
            report::heroes("Top Heroes", &top);
        }

        Command::Get { id, lenient } => {
            let hero = if lenient {
                service.get_by_id_lenient(id).await
            } else {
                service.get_by_id(id).await
            };
            match hero {
                Some(hero) => report::heroes("Hero", &[hero]),
                None => log::warn!("No hero with id {}", id),
            }
        }

        Command::Search { term } => {
            let heroes = service.search(&term).await;
            report::heroes(&format!("Search \"{}\"", term.trim()), &heroes);
        }

        Command::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                log::warn!("Hero name is empty, nothing to add");
            } else if let Some(hero) = service.create(&NewHero::new(name)).await {
                report::heroes("Added", &[hero]);
            }
        }

        Command::Rename { id, name } => {
            match service.get_by_id(id).await {
                Some(mut hero) => {
                    hero.name = name.trim().to_string();
                    service.update(&hero).await;
                }
                None => log::warn!("No hero with id {}", id),
            }
        }

        Command::Delete { id } => service.remove(id).await,

        Command::Watch => watch(service, &config).await?,

        // Handled before the backend is built
        Command::Validate => {}
    }

    report::messages(&messages.snapshot());

    Ok(())
}

/// Feed stdin lines into the search pipeline and print each result set.
async fn watch(service: Arc<HeroService>, config: &Config) -> Result<()> {
    let (pipeline, mut results) = SearchPipeline::spawn(service, &config.search);

    let printer = tokio::spawn(async move {
        while let Some(found) = results.recv().await {
            report::heroes(&format!("Search \"{}\"", found.term.trim()), &found.heroes);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        pipeline.submit(line)?;
    }

    pipeline.close().await;
    if let Err(e) = printer.await {
        log::error!("Result printer failed: {}", e);
    }
    Ok(())
}
