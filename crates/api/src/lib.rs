//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST routes over the document engine
//! - The acting-user extractor
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use docflow_store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document store.
    pub store: Store,
}

impl AppState {
    /// Creates state over `store`.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
