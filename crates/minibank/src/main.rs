//! MiniBank - account service with token-bound account access

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LogFormat, LoggingConfig, StoreBackend};
use minibank_api::{AppState, create_router};
use minibank_auth::{AuthFlow, TokenService};
use minibank_db::{AccountStore, Database, MemoryStore};

/// MiniBank - account service with token-bound account access
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "MINIBANK_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "MINIBANK_PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting MiniBank v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    // Initialize account store
    let store: Arc<dyn AccountStore> = match config.database.backend {
        StoreBackend::Sqlite => {
            if let Some(parent) = Path::new(&config.database.path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
            Arc::new(Database::new(&db_path).await?)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory account store; accounts are lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize token service
    let tokens = Arc::new(
        TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl()?)
            .context("Failed to initialize token service")?,
    );

    let auth = Arc::new(AuthFlow::new(store.clone(), tokens.clone())?);

    // Create application state
    let state = AppState::new(store, tokens, auth);

    // Initialize metrics
    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
