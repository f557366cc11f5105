use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::auth::lockout::{self, LockoutPolicy};
use crate::database::models::{Account, AdminAccount};
use crate::database::store::{
    AccountChanges, AccountQuery, AdminChanges, CredentialStore, NewAccount, NewAdminAccount,
    StoreError,
};

/// In-process credential store. Backs the test suite and database-free local
/// runs; mirrors the semantics of the Postgres implementation, including the
/// single-step lockout transition (applied under one mutex hold).
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    admins: HashMap<Uuid, AdminAccount>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: overwrite an admin's lockout fields directly, e.g. to age
    /// a lock past its expiry.
    pub fn set_admin_lock_state(
        &self,
        id: Uuid,
        login_attempts: i32,
        locked_until: Option<chrono::DateTime<Utc>>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(admin) = inner.admins.get_mut(&id) {
            admin.login_attempts = login_attempts;
            admin.locked_until = locked_until;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let email = email.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn insert_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let email = new.email.to_lowercase();

        if inner.accounts.values().any(|a| a.email == email) {
            return Err(StoreError::Duplicate("email"));
        }
        if inner.accounts.values().any(|a| a.username == new.username) {
            return Err(StoreError::Duplicate("username"));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            first_name: new.first_name,
            last_name: new.last_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_account_profile(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.accounts.get_mut(&id).map(|account| {
            if let Some(v) = changes.first_name {
                account.first_name = Some(v);
            }
            if let Some(v) = changes.last_name {
                account.last_name = Some(v);
            }
            account.updated_at = Utc::now();
            account.clone()
        }))
    }

    async fn list_accounts(
        &self,
        query: AccountQuery,
    ) -> Result<(Vec<Account>, i64), StoreError> {
        let inner = self.inner.lock().unwrap();
        let needle = query.search.map(|s| s.to_lowercase());

        let mut matches: Vec<Account> = inner
            .accounts
            .values()
            .filter(|a| query.role.map_or(true, |r| a.role == r))
            .filter(|a| {
                needle.as_deref().map_or(true, |n| {
                    a.username.to_lowercase().contains(n)
                        || a.email.contains(n)
                        || a.first_name.as_deref().unwrap_or("").to_lowercase().contains(n)
                        || a.last_name.as_deref().unwrap_or("").to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as i64;
        let limit = query.limit.clamp(1, 100) as usize;
        let offset = ((query.page.max(1) - 1) as usize) * limit;
        let page = matches.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn set_account_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<Account>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.accounts.get_mut(&id).map(|account| {
            account.is_active = active;
            account.updated_at = Utc::now();
            account.clone()
        }))
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.accounts.remove(&id).is_some())
    }

    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.admins.get(&id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError> {
        let email = email.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner.admins.values().find(|a| a.email == email).cloned())
    }

    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .admins
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn insert_admin(&self, new: NewAdminAccount) -> Result<AdminAccount, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let email = new.email.to_lowercase();

        if inner.admins.values().any(|a| a.email == email) {
            return Err(StoreError::Duplicate("email"));
        }
        if inner.admins.values().any(|a| a.username == new.username) {
            return Err(StoreError::Duplicate("username"));
        }

        let now = Utc::now();
        let admin = AdminAccount {
            id: Uuid::new_v4(),
            email,
            username: new.username,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            permissions: Json(Vec::new()),
            phone: new.phone,
            profile_picture: None,
            last_login_at: None,
            login_attempts: 0,
            locked_until: None,
            is_active: true,
            is_email_verified: true,
            assigned_sections: new.assigned_sections,
            created_at: now,
            updated_at: now,
        };
        inner.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn list_admins(&self) -> Result<Vec<AdminAccount>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut admins: Vec<AdminAccount> = inner.admins.values().cloned().collect();
        admins.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(admins)
    }

    async fn record_admin_failure(
        &self,
        id: Uuid,
        policy: &LockoutPolicy,
    ) -> Result<Option<AdminAccount>, StoreError> {
        // Single mutex hold covers read and write: the memory-store analogue
        // of the Postgres single-statement update.
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.admins.get_mut(&id).map(|admin| {
            let now = Utc::now();
            let next = lockout::on_failure(policy, admin.login_attempts, admin.locked_until, now);
            admin.login_attempts = next.attempts;
            admin.locked_until = next.locked_until;
            admin.updated_at = now;
            admin.clone()
        }))
    }

    async fn record_admin_success(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(admin) = inner.admins.get_mut(&id) {
            let now = Utc::now();
            admin.login_attempts = 0;
            admin.locked_until = None;
            admin.last_login_at = Some(now);
            admin.updated_at = now;
        }
        Ok(())
    }

    async fn update_admin_profile(
        &self,
        id: Uuid,
        changes: AdminChanges,
    ) -> Result<Option<AdminAccount>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.admins.get_mut(&id).map(|admin| {
            if let Some(v) = changes.first_name {
                admin.first_name = v;
            }
            if let Some(v) = changes.last_name {
                admin.last_name = v;
            }
            if let Some(v) = changes.phone {
                admin.phone = Some(v);
            }
            if let Some(v) = changes.profile_picture {
                admin.profile_picture = Some(v);
            }
            admin.updated_at = Utc::now();
            admin.clone()
        }))
    }

    async fn update_admin_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.admins.get_mut(&id) {
            Some(admin) => {
                admin.password_hash = password_hash.to_string();
                admin.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_admin_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<AdminAccount>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.admins.get_mut(&id).map(|admin| {
            admin.is_active = active;
            admin.updated_at = Utc::now();
            admin.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::database::models::AdminRole;

    use super::*;

    fn new_admin(email: &str, username: &str) -> NewAdminAccount {
        NewAdminAccount {
            email: email.into(),
            username: username.into(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".into(),
            first_name: "Admin".into(),
            last_name: "User".into(),
            role: AdminRole::SuperAdmin,
            phone: None,
            assigned_sections: Vec::new(),
        }
    }

    #[tokio::test]
    async fn fifth_failure_locks_and_success_resets() {
        let store = MemoryCredentialStore::new();
        let policy = LockoutPolicy::default();
        let admin = store.insert_admin(new_admin("a@x.com", "a")).await.unwrap();

        for expected in 1..=4 {
            let after = store
                .record_admin_failure(admin.id, &policy)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(after.login_attempts, expected);
            assert!(!after.is_locked(Utc::now()));
        }

        let locked = store
            .record_admin_failure(admin.id, &policy)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(locked.login_attempts, 5);
        assert!(locked.is_locked(Utc::now()));

        store.record_admin_success(admin.id).await.unwrap();
        let reset = store.find_admin_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(reset.login_attempts, 0);
        assert!(reset.locked_until.is_none());
        assert!(reset.last_login_at.is_some());
    }

    #[tokio::test]
    async fn failure_after_expired_lock_counts_as_attempt_one() {
        let store = MemoryCredentialStore::new();
        let policy = LockoutPolicy::default();
        let admin = store.insert_admin(new_admin("b@x.com", "b")).await.unwrap();

        store.set_admin_lock_state(admin.id, 5, Some(Utc::now() - Duration::minutes(1)));

        let after = store
            .record_admin_failure(admin.id, &policy)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.login_attempts, 1);
        assert!(after.locked_until.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_and_username_are_rejected_independently() {
        let store = MemoryCredentialStore::new();
        store.insert_admin(new_admin("dup@x.com", "one")).await.unwrap();

        let err = store
            .insert_admin(new_admin("DUP@x.com", "two"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));

        let err = store
            .insert_admin(new_admin("other@x.com", "one"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("username")));
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive() {
        let store = MemoryCredentialStore::new();
        store.insert_admin(new_admin("Mixed@X.com", "m")).await.unwrap();

        let found = store.find_admin_by_email("mixed@x.COM").await.unwrap();
        assert!(found.is_some());
    }
}
