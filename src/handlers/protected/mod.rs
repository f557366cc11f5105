pub mod auth;

use axum::routing::get;
use axum::{middleware, Router};

use crate::middleware::auth::require_user;
use crate::state::AppState;

/// Ordinary-account routes behind the user gate
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user))
        .with_state(state)
}
