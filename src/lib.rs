//! # Phonebook Backend
//!
//! CRUD HTTP service over person records (name + number) backed by MongoDB,
//! or by an in-memory store when no database is configured.
//!
//! ## API Overview
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/info` | GET | Record count and server time (HTML) |
//! | `/api/persons` | GET | List all persons |
//! | `/api/persons` | POST | Create a person |
//! | `/api/persons/:id` | GET | Fetch one person |
//! | `/api/persons/:id` | PUT | Replace name and number |
//! | `/api/persons/:id` | DELETE | Delete a person (always 204) |
//!
//! Anything else answers 404 `{"error":"unknown endpoint"}`.

pub mod config;
pub mod handlers;
pub mod logger;
pub mod models;
pub mod store;

pub use config::Config;
pub use handlers::AppState;
pub use store::{MemoryStore, PersonStore};

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Maximum request body size (16 KiB).
pub const MAX_BODY_SIZE: usize = 16 * 1024;

/// Build the Axum router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/info", get(handlers::info).fallback(handlers::unknown_endpoint))
        .route(
            "/api/persons",
            get(handlers::list_persons)
                .post(handlers::create_person)
                .fallback(handlers::unknown_endpoint),
        )
        .route(
            "/api/persons/:id",
            get(handlers::get_person)
                .put(handlers::update_person)
                .delete(handlers::delete_person)
                .fallback(handlers::unknown_endpoint),
        )
        .fallback(handlers::unknown_endpoint)
        // Middleware stack: each layer wraps the ones added before it, so a
        // request passes Trace, then CORS, then the body limit, then the logger.
        .layer(middleware::from_fn(logger::log_requests))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
