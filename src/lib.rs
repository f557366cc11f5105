use axum::routing::get;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use state::AppState;

/// Assemble the full router. Kept out of main so the integration tests can
/// drive the exact same application against an in-memory store.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .with_state(state.clone())
        .merge(handlers::public::routes(state.clone()))
        .merge(handlers::protected::routes(state.clone()))
        .merge(handlers::admin::routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
