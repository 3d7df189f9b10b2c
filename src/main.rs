//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Opens the record store
//! - Starts the HTTP server with graceful shutdown support

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use url_shortener::config::Config;
use url_shortener::database::RedbStore;
use url_shortener::handler::AppState;
use url_shortener::manager::UrlManager;
use url_shortener::route::create_app;

const DEFAULT_TRACING_LEVEL: &str = "url_shortener=debug,tower_http=debug";

/// Application entry point
///
/// See [`Config`] for the environment variables read at startup.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_TRACING_LEVEL.into()),
        )
        .init();

    let config = Config::from_env();

    let store = RedbStore::open(&config.database_url).expect("Failed to initialize database");
    let manager = UrlManager::new(Arc::new(store));
    let state = AppState::new(manager, &config.base_url);

    let app = create_app(state).layer(TraceLayer::new_for_http());

    // Bind to all network interfaces on the specified port
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Creating tcp listener failed");

    tracing::info!("Server running at {}", config.base_url);
    tracing::info!("Using database: {}", config.database_url);

    // Open connections are allowed to finish before the process exits
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

/// Returns when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
