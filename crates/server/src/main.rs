use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cubealg_core::{
    create_repository, load_config, validate_config, AlgorithmRepository, RandomSelectors,
    SanitizedConfig, SystemClock,
};
use cubealg_server::api::create_router;
use cubealg_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // An explicit path must exist; otherwise ./config.toml is optional
    let config_path = std::env::var("CUBEALG_CONFIG").ok().map(PathBuf::from);
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!("Configuration loaded: {}", sanitized);

    // Create algorithm store
    let repository: Arc<dyn AlgorithmRepository> = Arc::from(
        create_repository(&config.store).context("Failed to create algorithm store")?,
    );
    info!("Using {} algorithm store", repository.backend_name());

    // Daily random selectors start from the configured picks
    let selectors = RandomSelectors::new(&config.selector, Arc::new(SystemClock));

    let state = Arc::new(AppState::new(repository, selectors));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Rubiks algorithm REST API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
