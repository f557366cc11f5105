pub mod auth;
pub mod manage;
pub mod profile;
pub mod users;

use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{AdminAccount, AdminRole};
use crate::middleware::auth::require_admin;
use crate::state::AppState;

/// Administrative surface: public token acquisition plus the admin-gated
/// management routes. Super-admin-only handlers re-check the role themselves
/// on top of the coarse gate.
pub fn routes(state: AppState) -> Router {
    let public = Router::new()
        .route("/admin/auth/login", post(auth::login))
        .route("/admin/auth/init", post(auth::init))
        .with_state(state.clone());

    let guarded = Router::new()
        .route("/admin/auth/register", post(manage::register))
        .route(
            "/admin/auth/profile",
            get(profile::profile).put(profile::update_profile),
        )
        .route("/admin/auth/change-password", put(profile::change_password))
        .route("/admin/auth/list", get(manage::list))
        .route("/admin/auth/:id/toggle-status", put(manage::toggle_status))
        .route("/admin/users", get(users::list_users))
        .route("/admin/users/add", post(users::add_user))
        .route("/admin/users/:id/toggle-status", put(users::toggle_status))
        .route("/admin/users/:id", delete(users::delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .with_state(state);

    public.merge(guarded)
}

/// Password-free admin view for login and management responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AdminRole,
    pub profile_picture: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl From<&AdminAccount> for AdminSummary {
    fn from(admin: &AdminAccount) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            username: admin.username.clone(),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            role: admin.role,
            profile_picture: admin.profile_picture.clone(),
            kind: "admin",
        }
    }
}
