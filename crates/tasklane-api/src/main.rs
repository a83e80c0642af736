//! Tasklane Server Binary
//!
//! Task CRUD service over a document store.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! tasklane --config config.yaml
//!
//! # With environment variables only
//! TASKLANE_SERVER__PORT=9090 tasklane
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tracing::{error, info};

use tasklane_api::http::{create_router, AppState};
use tasklane_server::ServerConfig;
use tasklane_storage::MemoryDocumentStore;

/// Tasklane - Task CRUD service
#[derive(Parser, Debug)]
#[command(name = "tasklane")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = args.config {
        ServerConfig::load(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    init_logging(&config);

    // Construct the storage dependency explicitly and pass it in
    let storage = MemoryDocumentStore::new_shared(config.storage.table_name.clone());
    let state = AppState::new(storage);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, table = %config.storage.table_name, "starting tasklane server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Initialize the logging subsystem per the configured format and level.
///
/// The RUST_LOG environment variable, when set, overrides the configured
/// level.
fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.json {
        // JSON formatted logging for production
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true));
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        // Text logging for development
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true));
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!("failed to listen for shutdown signal: {e}"),
    }
}
