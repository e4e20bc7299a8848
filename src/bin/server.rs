// Book Catalog - HTTP server
// Run with: cargo run --bin server

//! # Book Catalog Server Binary
//!
//! Loads configuration, opens the configured book store once, and serves the
//! REST and GraphQL APIs until Ctrl-C or SIGTERM.
//!
//! Precedence, lowest first: built-in defaults, `--config` file,
//! `BOOK_CATALOG_*` environment variables, command-line flags.
//!
//! ## Rust Learning Notes:
//!
//! `#[tokio::main]` turns the async `main` into a synchronous entry point that
//! builds the runtime. Returning `anyhow::Result` lets every startup failure
//! bubble up with `?` and print with its context chain.

use anyhow::{Context, Result};
use book_catalog::{open_storage, CatalogConfig, CatalogServerBuilder, CatalogServerConfig, StorageBackend};
use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "book-catalog-server")]
#[command(about = "Book catalog HTTP server (REST + GraphQL)")]
#[command(version)]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "BOOK_CATALOG_CONFIG")]
    config: Option<String>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Storage backend: memory or nats
    #[arg(long)]
    storage: Option<StorageBackend>,

    /// NATS server URL
    #[arg(long, env = "NATS_URL")]
    nats_url: Option<String>,

    /// Key-value bucket holding the books
    #[arg(long)]
    bucket: Option<String>,

    /// Mount the REST API under this path, e.g. /api
    #[arg(long)]
    rest_prefix: Option<String>,

    /// Disable permissive CORS
    #[arg(long)]
    no_cors: bool,
}

impl Args {
    fn apply(self, mut config: CatalogConfig) -> CatalogConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(backend) = self.storage {
            config.storage.backend = backend;
        }
        if let Some(url) = self.nats_url {
            config.storage.nats_url = url;
        }
        if let Some(bucket) = self.bucket {
            config.storage.bucket = bucket;
        }
        if let Some(prefix) = self.rest_prefix {
            config.rest_prefix = prefix;
        }
        if self.no_cors {
            config.cors_enabled = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let dotenv_result = dotenv();

    let args = Args::parse();
    let config = CatalogConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = args.apply(config);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = dotenv_result {
        warn!("No .env file loaded: {}", e);
    }

    info!("🚀 Starting Book Catalog Server...");
    info!("=====================================");
    info!("Storage backend: {:?}", config.storage.backend);
    if config.storage.backend == StorageBackend::Nats {
        info!("NATS: {} (bucket '{}')", config.storage.nats_url, config.storage.bucket);
    }

    let storage = open_storage(&config.storage)
        .await
        .context("Failed to open book storage")?;

    CatalogServerBuilder::new()
        .with_config(CatalogServerConfig::from(&config))
        .with_storage(storage)
        .build_and_run()
        .await?;

    Ok(())
}
