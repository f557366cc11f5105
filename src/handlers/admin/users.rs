use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::database::models::{Account, UserRole};
use crate::database::store::{AccountQuery, CredentialStore, NewAccount};
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListData {
    pub users: Vec<Account>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

/// GET /admin/users - paged ordinary-account list with role/search filters
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<UserListData> {
    let role = match params.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => Some(
            raw.parse::<UserRole>()
                .map_err(|_| ApiError::validation(format!("Unknown role: {}", raw)))?,
        ),
        None => None,
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let (users, total) = state
        .store
        .list_accounts(AccountQuery {
            role,
            search: non_empty(params.search),
            page,
            limit,
        })
        .await?;

    Ok(ApiResponse::success(UserListData {
        users,
        total_pages: (total + limit - 1) / limit,
        current_page: page,
        total,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

/// POST /admin/users/add - create an ordinary account with an explicit role
pub async fn add_user(
    State(state): State<AppState>,
    Json(body): Json<AddUserRequest>,
) -> ApiResult<Value> {
    let (username, email, password) = match (
        non_empty(body.username),
        non_empty(body.email),
        non_empty(body.password),
    ) {
        (Some(username), Some(email), Some(password)) => (username, email, password),
        _ => {
            return Err(ApiError::validation(
                "Please provide username, email, and password",
            ))
        }
    };

    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let role = match non_empty(body.role) {
        Some(raw) => raw
            .parse::<UserRole>()
            .map_err(|_| ApiError::validation(format!("Unknown role: {}", raw)))?,
        None => UserRole::Patient,
    };

    if state.store.find_account_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already exists"));
    }
    if state
        .store
        .find_account_by_username(&username)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Username already exists"));
    }

    let password_hash = password::hash(&password, state.bcrypt_cost).await?;
    let account = state
        .store
        .insert_account(NewAccount {
            email,
            username,
            password_hash,
            role,
            first_name: non_empty(body.first_name),
            last_name: non_empty(body.last_name),
        })
        .await?;

    tracing::info!(account_id = %account.id, "account created by admin");
    Ok(ApiResponse::created(json!({
        "message": "User created successfully",
        "user": account
    })))
}

/// PUT /admin/users/:id/toggle-status - flip an ordinary account's active flag
pub async fn toggle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let account = state
        .store
        .find_account_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let updated = state
        .store
        .set_account_active(account.id, !account.is_active)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(account_id = %updated.id, active = updated.is_active, "user status toggled");
    Ok(ApiResponse::success(json!({
        "message": format!(
            "User status updated to {}",
            if updated.is_active { "active" } else { "inactive" }
        ),
        "user": updated
    })))
}

/// DELETE /admin/users/:id
///
/// Accounts whose role is `admin` are not deletable through this path; the
/// legacy-fallback bridge depends on them.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let account = state
        .store
        .find_account_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if account.role == UserRole::Admin {
        return Err(ApiError::forbidden("Cannot delete admin users"));
    }

    state.store.delete_account(account.id).await?;

    tracing::info!(account_id = %account.id, "user deleted");
    Ok(ApiResponse::success(json!({
        "message": "User deleted successfully"
    })))
}
