//! Phonebook Backend - person records over HTTP
//!
//! Reads `PORT` and `MONGODB_URI` (plus optional overrides) from the
//! environment or a `.env` file, connects to the database once and serves
//! the API until the process is stopped.

use axum::Router;
use phonebook_backend::{build_router, store, AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env();
    log_startup_info(&config);

    let store = store::connect(&config)
        .await
        .expect("Failed to initialize person store");
    let state = AppState::new(store);

    let app = build_router(state);
    serve(app, &config).await;
}

/// Initialize tracing with environment-based log levels.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("phonebook_backend=debug,tower_http=info")),
        )
        .init();
}

/// Log startup configuration (never the connection string).
fn log_startup_info(config: &Config) {
    info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        storage = config.storage_label(),
        collection = %config.mongodb_collection,
        "Starting phonebook backend"
    );
}

/// Bind to address and serve the application.
async fn serve(app: Router, config: &Config) {
    let bind_addr = format!("{}:{}", config.bind_addr, config.port);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %bind_addr, "Server running");

    axum::serve(listener, app).await.expect("Server error");
}
