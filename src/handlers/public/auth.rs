use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::auth::token::TokenSubject;
use crate::database::models::{Account, UserRole};
use crate::database::store::{CredentialStore, NewAccount};
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Password-free account view returned with a fresh token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl From<&Account> for UserSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            username: account.username.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            role: account.role,
            kind: "user",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    pub token: String,
    pub user: UserSummary,
}

/// POST /auth/login - authenticate an ordinary account
///
/// No lockout here: the failure counter exists only on the administrative
/// store.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<SessionData> {
    let (email, password) = match (non_empty(body.email), non_empty(body.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::validation("Please provide email and password")),
    };

    // Unknown email and wrong password produce the same error
    let account = state
        .store
        .find_account_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !account.is_active {
        tracing::warn!(account_id = %account.id, "login rejected: account inactive");
        return Err(ApiError::AccountInactive);
    }

    if !password::verify(&password, &account.password_hash).await? {
        tracing::warn!(account_id = %account.id, "login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(TokenSubject::User {
        id: account.id,
        role: account.role,
    })?;

    tracing::info!(account_id = %account.id, "login succeeded");
    Ok(ApiResponse::success(SessionData {
        token,
        user: UserSummary::from(&account),
    }))
}

/// POST /auth/register - create an ordinary account
///
/// Public registration always creates a patient; elevated roles are granted
/// through separate approval flows.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<SessionData> {
    let (email, username, password) = match (
        non_empty(body.email),
        non_empty(body.username),
        non_empty(body.password),
    ) {
        (Some(email), Some(username), Some(password)) => (email, username, password),
        _ => {
            return Err(ApiError::validation(
                "Please provide email, username, and password",
            ))
        }
    };

    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

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
            role: UserRole::Patient,
            first_name: non_empty(body.first_name),
            last_name: non_empty(body.last_name),
        })
        .await?;

    let token = state.tokens.issue(TokenSubject::User {
        id: account.id,
        role: account.role,
    })?;

    tracing::info!(account_id = %account.id, "account registered");
    Ok(ApiResponse::created(SessionData {
        token,
        user: UserSummary::from(&account),
    }))
}
