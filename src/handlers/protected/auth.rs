use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::principal::UserPrincipal;
use crate::database::models::Account;
use crate::database::store::{AccountChanges, CredentialStore};
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// GET /auth/profile - current account, password omitted
pub async fn profile(
    State(state): State<AppState>,
    Extension(principal): Extension<UserPrincipal>,
) -> ApiResult<Account> {
    let account = state
        .store
        .find_account_by_id(principal.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(account))
}

/// PUT /auth/profile - partial profile update
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<UserPrincipal>,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<Account> {
    let changes = AccountChanges {
        first_name: non_empty(body.first_name),
        last_name: non_empty(body.last_name),
    };

    let account = state
        .store
        .update_account_profile(principal.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(account))
}
