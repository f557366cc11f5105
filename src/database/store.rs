use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::lockout::LockoutPolicy;
use crate::database::models::{Account, AdminAccount, AdminRole, UserRole};

/// Errors from the credential store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("store call timed out after {0}ms")]
    Timeout(u64),

    #[error("duplicate value for unique field: {0}")]
    Duplicate(&'static str),

    #[error("query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAdminAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AdminRole,
    pub phone: Option<String>,
    pub assigned_sections: Vec<String>,
}

/// Partial profile update; None leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AdminChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
}

/// Paged filter over ordinary accounts
#[derive(Debug, Clone, Default)]
pub struct AccountQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

/// Boundary to the two disjoint identity stores. Lookups are exact on unique
/// fields (email matching is case-insensitive); `record_admin_failure` is the
/// single-step lockout transition and MUST be atomic per account — two
/// concurrent failures both land.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // Ordinary accounts
    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_account_by_username(&self, username: &str)
        -> Result<Option<Account>, StoreError>;
    async fn insert_account(&self, new: NewAccount) -> Result<Account, StoreError>;
    async fn update_account_profile(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StoreError>;
    async fn list_accounts(&self, query: AccountQuery)
        -> Result<(Vec<Account>, i64), StoreError>;
    async fn set_account_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<Account>, StoreError>;
    async fn delete_account(&self, id: Uuid) -> Result<bool, StoreError>;

    // Administrative accounts
    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>, StoreError>;
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError>;
    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, StoreError>;
    async fn insert_admin(&self, new: NewAdminAccount) -> Result<AdminAccount, StoreError>;
    async fn list_admins(&self) -> Result<Vec<AdminAccount>, StoreError>;

    /// Apply the lockout failure transition atomically and return the
    /// post-transition record, or None for an unknown id.
    async fn record_admin_failure(
        &self,
        id: Uuid,
        policy: &LockoutPolicy,
    ) -> Result<Option<AdminAccount>, StoreError>;

    /// Successful credential check: reset the counter, clear any lock, stamp
    /// the last-login time.
    async fn record_admin_success(&self, id: Uuid) -> Result<(), StoreError>;

    async fn update_admin_profile(
        &self,
        id: Uuid,
        changes: AdminChanges,
    ) -> Result<Option<AdminAccount>, StoreError>;
    async fn update_admin_password(&self, id: Uuid, password_hash: &str)
        -> Result<bool, StoreError>;
    async fn set_admin_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<AdminAccount>, StoreError>;
}
