use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::auth::principal::AdminPrincipal;
use crate::database::models::AdminAccount;
use crate::database::store::{AdminChanges, CredentialStore};
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// GET /admin/auth/profile
///
/// 404 covers the edge where the record vanished between gate and handler.
pub async fn profile(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
) -> ApiResult<AdminAccount> {
    let admin = state
        .store
        .find_admin_by_id(principal.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    Ok(ApiResponse::success(admin))
}

/// PUT /admin/auth/profile - partial profile update
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<AdminAccount> {
    let changes = AdminChanges {
        first_name: non_empty(body.first_name),
        last_name: non_empty(body.last_name),
        phone: non_empty(body.phone),
        profile_picture: non_empty(body.profile_picture),
    };

    let admin = state
        .store
        .update_admin_profile(principal.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    Ok(ApiResponse::success(admin))
}

/// PUT /admin/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Value> {
    let (current, new) = match (non_empty(body.current_password), non_empty(body.new_password)) {
        (Some(current), Some(new)) => (current, new),
        _ => {
            return Err(ApiError::validation(
                "Please provide current and new password",
            ))
        }
    };

    if new.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let admin = state
        .store
        .find_admin_by_id(principal.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    if !password::verify(&current, &admin.password_hash).await? {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    let password_hash = password::hash(&new, state.bcrypt_cost).await?;
    state
        .store
        .update_admin_password(admin.id, &password_hash)
        .await?;

    tracing::info!(admin_id = %admin.id, "admin password changed");
    Ok(ApiResponse::success(json!({
        "message": "Password changed successfully"
    })))
}
