use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::auth::capability::{self, Capability};
use crate::auth::principal::{AdminPrincipal, Principal, UserPrincipal};
use crate::auth::token::TokenSubject;
use crate::database::models::UserRole;
use crate::database::store::CredentialStore;
use crate::error::ApiError;
use crate::state::AppState;

/// Bearer tokens ride a custom header, not `Authorization`; the SPA client
/// has always sent it this way.
pub const AUTH_HEADER: &str = "x-auth-token";

fn extract_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::TokenInvalid)
}

/// Gate for ordinary routes. The token must carry a user subject backed by a
/// live, active account; the role comes from the account record, not the
/// token. Injects `UserPrincipal` and `Principal` into request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())?;
    let subject = state.tokens.verify(token).map_err(|_| ApiError::TokenInvalid)?;

    let TokenSubject::User { id, .. } = subject else {
        return Err(ApiError::TokenInvalid);
    };

    let account = state
        .store
        .find_account_by_id(id)
        .await?
        .ok_or(ApiError::TokenInvalid)?;
    if !account.is_active {
        return Err(ApiError::TokenInvalid);
    }

    let principal = UserPrincipal::from_account(&account);
    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(Principal::User(principal));
    Ok(next.run(request).await)
}

/// Gate for admin routes. Resolves a native admin principal from the admin
/// store, or synthesizes a super-admin view for a legacy ordinary account
/// whose role is `admin`. Injects `AdminPrincipal` and `Principal`.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())?;
    let subject = state.tokens.verify(token).map_err(|_| ApiError::TokenInvalid)?;

    let principal = resolve_admin(&state, subject).await?;
    if !capability::satisfies(
        &Principal::Admin(principal.clone()),
        Capability::AdministrativeAccess,
    ) {
        return Err(ApiError::forbidden("Access denied. Admin role required."));
    }

    request.extensions_mut().insert(principal.clone());
    request.extensions_mut().insert(Principal::Admin(principal));
    Ok(next.run(request).await)
}

async fn resolve_admin(
    state: &AppState,
    subject: TokenSubject,
) -> Result<AdminPrincipal, ApiError> {
    match subject {
        TokenSubject::Admin { id, .. } => {
            let admin = state
                .store
                .find_admin_by_id(id)
                .await?
                .ok_or(ApiError::TokenInvalid)?;

            if !admin.is_active {
                tracing::warn!(admin_id = %admin.id, "admin gate rejected: account inactive");
                return Err(ApiError::AccountInactive);
            }
            if admin.is_locked(Utc::now()) {
                tracing::warn!(admin_id = %admin.id, "admin gate rejected: account locked");
                return Err(ApiError::AccountLocked);
            }

            Ok(AdminPrincipal::from_admin_account(&admin))
        }
        TokenSubject::User { id, .. } => {
            let account = state
                .store
                .find_account_by_id(id)
                .await?
                .ok_or(ApiError::TokenInvalid)?;

            if !account.is_active {
                return Err(ApiError::TokenInvalid);
            }
            if account.role != UserRole::Admin {
                return Err(ApiError::forbidden("Access denied. Admin role required."));
            }

            // Legacy fallback: read-only synthesis, nothing is written back
            Ok(AdminPrincipal::from_legacy_account(&account))
        }
    }
}

/// Route guard for a declared capability, layered after one of the gates
/// above. Used with ordinary-role allow-lists, e.g. doctor-only resources.
pub async fn require_capability(
    required: Capability,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::internal("capability check before authentication"))?;

    if !capability::satisfies(principal, required) {
        return Err(ApiError::forbidden("Insufficient role for this resource"));
    }
    Ok(next.run(request).await)
}
