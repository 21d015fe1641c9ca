//! Issue Tracker REST API Server
//!
//! Serves project-scoped issues over HTTP from a JSON-file or in-memory
//! store.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tracker::config::StorageBackend;
use tracker::{InMemoryStorage, IssueService, IssueStore, JsonFileStorage, TrackerConfig};

/// Command-line arguments. Flags override environment variables, which
/// override `<data-dir>/config.toml`.
#[derive(Debug, Parser)]
#[command(name = "tracker-server", version, about = "REST API server for the issue tracker")]
struct Args {
    /// Directory holding config.toml and the JSON issue store
    #[arg(long, env = "TRACKER_DATA_DIR", default_value = ".tracker")]
    data_dir: PathBuf,

    /// Address to listen on (default: 0.0.0.0:3000)
    #[arg(long, env = "TRACKER_BIND")]
    bind: Option<String>,

    /// Storage backend: json or memory
    #[arg(long, env = "TRACKER_STORAGE")]
    storage: Option<StorageBackend>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "TRACKER_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TrackerConfig::load(&args.data_dir).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            args.data_dir.display()
        )
    })?;

    // Initialize tracing
    let level = args.log_level.clone().unwrap_or_else(|| config.log_level());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Starting issue tracker API server...");

    let bind = args.bind.clone().unwrap_or_else(|| config.bind());
    let backend = args.storage.unwrap_or_else(|| config.storage_backend());

    match backend {
        StorageBackend::Json => {
            info!("Using JSON storage at: {}", args.data_dir.display());
            serve(JsonFileStorage::new(&args.data_dir), &bind, config.cors()).await
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; issues are lost on shutdown");
            serve(InMemoryStorage::new(), &bind, config.cors()).await
        }
    }
}

async fn serve<S: IssueStore + 'static>(storage: S, bind: &str, cors: bool) -> Result<()> {
    let service = IssueService::new(storage);
    service
        .init()
        .context("Failed to initialize storage")?;

    let app = tracker_server::build_app(Arc::new(service), cors);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Server listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
