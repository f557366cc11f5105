pub mod auth;

use axum::routing::post;
use axum::Router;

use crate::state::AppState;

/// Public ordinary-account routes: token acquisition only
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .with_state(state)
}
