use thiserror::Error;

use crate::auth::password::{self, PasswordError};
use crate::config::BootstrapConfig;
use crate::database::models::{AdminAccount, AdminRole};
use crate::database::store::{CredentialStore, NewAdminAccount, StoreError};
use crate::error::ApiError;

/// Sections granted to the default super-admin
pub const DEFAULT_SECTIONS: &[&str] = &["users", "doctors", "hospitals", "courses", "forum", "all"];

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<BootstrapError> for ApiError {
    fn from(err: BootstrapError) -> Self {
        match err {
            BootstrapError::Store(e) => e.into(),
            BootstrapError::Password(e) => e.into(),
        }
    }
}

#[derive(Debug)]
pub enum BootstrapOutcome {
    Existing(AdminAccount),
    Created(AdminAccount),
}

/// Make sure the default super-admin exists. Runs once before the server
/// accepts connections, and again behind POST /admin/auth/init; both callers
/// rely on it being idempotent. Login never calls this.
pub async fn ensure_default_admin(
    store: &dyn CredentialStore,
    cfg: &BootstrapConfig,
    bcrypt_cost: u32,
) -> Result<BootstrapOutcome, BootstrapError> {
    if let Some(existing) = store.find_admin_by_email(&cfg.admin_email).await? {
        return Ok(BootstrapOutcome::Existing(existing));
    }

    let password_hash = password::hash(&cfg.admin_password, bcrypt_cost).await?;
    let new = NewAdminAccount {
        email: cfg.admin_email.clone(),
        username: "admin".to_string(),
        password_hash,
        first_name: "Super".to_string(),
        last_name: "Admin".to_string(),
        role: AdminRole::SuperAdmin,
        phone: None,
        assigned_sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
    };

    match store.insert_admin(new).await {
        Ok(admin) => {
            tracing::info!(admin_id = %admin.id, "default admin created");
            Ok(BootstrapOutcome::Created(admin))
        }
        // A concurrent bootstrap won the insert; treat its record as ours
        Err(StoreError::Duplicate(_)) => {
            let existing = store
                .find_admin_by_email(&cfg.admin_email)
                .await?
                .ok_or_else(|| {
                    StoreError::Query("default admin vanished during bootstrap".to_string())
                })?;
            Ok(BootstrapOutcome::Existing(existing))
        }
        Err(e) => Err(e.into()),
    }
}
