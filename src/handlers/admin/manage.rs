use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::capability::{satisfies, Capability};
use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::auth::principal::{AdminPrincipal, Principal};
use crate::database::models::{AdminAccount, AdminRole};
use crate::database::store::{CredentialStore, NewAdminAccount};
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::AdminSummary;

/// Stricter second layer on top of the admin gate: these operations manage
/// other admin accounts and require the super-admin role exactly.
fn require_super_admin(principal: &AdminPrincipal, action: &str) -> Result<(), ApiError> {
    if !satisfies(
        &Principal::Admin(principal.clone()),
        Capability::SuperAdminOps,
    ) {
        return Err(ApiError::forbidden(format!(
            "Only super-admin can {}",
            action
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdminRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
}

/// POST /admin/auth/register - create a new admin account
pub async fn register(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Json(body): Json<RegisterAdminRequest>,
) -> ApiResult<Value> {
    require_super_admin(&principal, "create new admin accounts")?;

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

    // New admins default to moderator; only an explicit role overrides it
    let role = match non_empty(body.role) {
        Some(raw) => raw
            .parse::<AdminRole>()
            .map_err(|_| ApiError::validation(format!("Unknown admin role: {}", raw)))?,
        None => AdminRole::Moderator,
    };

    if state.store.find_admin_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Admin with this email already exists"));
    }
    if state
        .store
        .find_admin_by_username(&username)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Username already taken"));
    }

    let password_hash = password::hash(&password, state.bcrypt_cost).await?;
    let admin = state
        .store
        .insert_admin(NewAdminAccount {
            email,
            username,
            password_hash,
            first_name: non_empty(body.first_name).unwrap_or_else(|| "Admin".to_string()),
            last_name: non_empty(body.last_name).unwrap_or_else(|| "User".to_string()),
            role,
            phone: non_empty(body.phone),
            assigned_sections: Vec::new(),
        })
        .await?;

    tracing::info!(admin_id = %admin.id, created_by = %principal.id, "admin account created");
    Ok(ApiResponse::created(json!({
        "message": "Admin created successfully",
        "admin": AdminSummary::from(&admin)
    })))
}

#[derive(Debug, Serialize)]
pub struct AdminListData {
    pub admins: Vec<AdminAccount>,
    pub total: usize,
}

/// GET /admin/auth/list - all admin accounts, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
) -> ApiResult<AdminListData> {
    require_super_admin(&principal, "view all admins")?;

    let admins = state.store.list_admins().await?;
    let total = admins.len();
    Ok(ApiResponse::success(AdminListData { admins, total }))
}

/// PUT /admin/auth/:id/toggle-status - flip another admin's active flag
///
/// Self-toggle is always refused; an administrator cannot deactivate the
/// account they are acting under.
pub async fn toggle_status(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    require_super_admin(&principal, "modify admin status")?;

    let admin = state
        .store
        .find_admin_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    if admin.id == principal.id {
        return Err(ApiError::validation("Cannot deactivate your own account"));
    }

    let updated = state
        .store
        .set_admin_active(admin.id, !admin.is_active)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    tracing::info!(
        admin_id = %updated.id,
        toggled_by = %principal.id,
        active = updated.is_active,
        "admin status toggled"
    );
    Ok(ApiResponse::success(json!({
        "message": format!(
            "Admin account {}",
            if updated.is_active { "activated" } else { "deactivated" }
        ),
        "admin": {
            "id": updated.id,
            "email": updated.email,
            "isActive": updated.is_active
        }
    })))
}
