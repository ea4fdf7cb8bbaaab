//! List Engine CLI
//!
//! Runs one list request against the configured database and prints the
//! page as JSON.
//!
//! ```sh
//! # Default config (~/.config/list-engine/config.toml)
//! list-engine --entity products --request request.json
//!
//! # Request from stdin, migrate first
//! echo '{"search":{"query":"lamp"}}' | list-engine --entity products --request - --migrate
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use tracing::{error, info};

use list_engine::config::AppConfig;
use list_engine::infrastructure::database::migrator::Migrator;
use list_engine::infrastructure::database::{ProductRepository, UserRepository};
use list_engine::{default_config_path, init_database, AllowAll, ListRequest, ListService};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EntityKind {
    Users,
    Products,
}

/// Search, filter, sort and paginate an entity list.
#[derive(Parser, Debug)]
#[command(name = "list-engine", version, about = "Run a list query and print the page as JSON")]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "LIST_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Entity to list.
    #[arg(short, long, value_enum)]
    entity: EntityKind,

    /// JSON list request; `-` reads stdin. Omitted means an empty request.
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Run database migrations before querying.
    #[arg(long)]
    migrate: bool,
}

fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    // stdout carries the JSON page
    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn read_request(path: Option<&Path>) -> Result<ListRequest, Box<dyn std::error::Error>> {
    let raw = match path {
        None => return Ok(ListRequest::default()),
        Some(p) if p == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(p) => std::fs::read_to_string(p)?,
    };
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration resolved from {}", config_path.display());

    // ── Database ───────────────────────────────────────────────
    let db_config = config.database_config();
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    if cli.migrate || db_config.is_memory() {
        info!("Running database migrations...");
        if let Err(e) = Migrator::up(&db, None).await {
            error!("Failed to run migrations: {}", e);
            return Err(e.into());
        }
        info!("Migrations completed");
    }

    // ── Run the request ────────────────────────────────────────
    let request = read_request(cli.request.as_deref())?;
    let service = ListService::new(Arc::new(AllowAll), config.list_options());

    let result = match cli.entity {
        EntityKind::Users => {
            let source = UserRepository::new(db.clone()).list_source();
            match service.get_list_page_data(&source, &request).await {
                Ok(page) => print_json(&page),
                Err(e) => Err(e.into()),
            }
        }
        EntityKind::Products => {
            let source = ProductRepository::new(db.clone()).list_source();
            match service.get_list_page_data(&source, &request).await {
                Ok(page) => print_json(&page),
                Err(e) => Err(e.into()),
            }
        }
    };

    if let Err(e) = db.close().await {
        error!("Error closing database connection: {}", e);
    }

    if let Err(ref e) = result {
        error!("List request failed: {}", e);
    }
    result
}
