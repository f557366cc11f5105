use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::password;
use crate::auth::token::TokenSubject;
use crate::bootstrap::{self, BootstrapOutcome};
use crate::database::store::CredentialStore;
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::AdminSummary;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminSessionData {
    pub token: String,
    pub admin: AdminSummary,
}

/// POST /admin/auth/login - authenticate an administrative account
///
/// Check order is load-bearing: unknown email, locked, inactive, then the
/// password itself. A locked account is rejected before any credential
/// comparison and without touching the failure counter.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AdminSessionData> {
    let (email, password) = match (non_empty(body.email), non_empty(body.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::validation("Please provide email and password")),
    };

    let admin = state
        .store
        .find_admin_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if admin.is_locked(Utc::now()) {
        tracing::warn!(admin_id = %admin.id, "admin login rejected: account locked");
        return Err(ApiError::AccountLocked);
    }

    if !admin.is_active {
        tracing::warn!(admin_id = %admin.id, "admin login rejected: account inactive");
        return Err(ApiError::AccountInactive);
    }

    if !password::verify(&password, &admin.password_hash).await? {
        state
            .store
            .record_admin_failure(admin.id, &state.lockout)
            .await?;
        tracing::warn!(admin_id = %admin.id, "admin login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    state.store.record_admin_success(admin.id).await?;

    let token = state.tokens.issue(TokenSubject::Admin {
        id: admin.id,
        role: admin.role,
    })?;

    tracing::info!(admin_id = %admin.id, "admin login succeeded");
    Ok(ApiResponse::success(AdminSessionData {
        token,
        admin: AdminSummary::from(&admin),
    }))
}

/// POST /admin/auth/init - explicit bootstrap for first-time setup
///
/// Same idempotent routine the server runs at startup; safe to call any
/// number of times.
pub async fn init(State(state): State<AppState>) -> ApiResult<Value> {
    let outcome =
        bootstrap::ensure_default_admin(state.store.as_ref(), &state.bootstrap, state.bcrypt_cost)
            .await?;

    match outcome {
        BootstrapOutcome::Existing(admin) => Ok(ApiResponse::success(json!({
            "message": "Admin already exists",
            "admin": {
                "email": admin.email,
                "username": admin.username,
                "role": admin.role
            }
        }))),
        BootstrapOutcome::Created(admin) => Ok(ApiResponse::created(json!({
            "message": "Admin initialized successfully",
            "admin": {
                "email": admin.email,
                "username": admin.username,
                "role": admin.role
            }
        }))),
    }
}
