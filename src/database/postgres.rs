use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::lockout::LockoutPolicy;
use crate::config::DatabaseConfig;
use crate::database::models::{Account, AdminAccount};
use crate::database::store::{
    AccountChanges, AccountQuery, AdminChanges, CredentialStore, NewAccount, NewAdminAccount,
    StoreError,
};

const ACCOUNTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'patient',
    first_name TEXT,
    last_name TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const ADMINS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS admins (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    first_name TEXT NOT NULL DEFAULT 'Admin',
    last_name TEXT NOT NULL DEFAULT 'User',
    role TEXT NOT NULL DEFAULT 'super-admin',
    permissions JSONB NOT NULL DEFAULT '[]',
    phone TEXT,
    profile_picture TEXT,
    last_login_at TIMESTAMPTZ,
    login_attempts INTEGER NOT NULL DEFAULT 0,
    locked_until TIMESTAMPTZ,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_email_verified BOOLEAN NOT NULL DEFAULT TRUE,
    assigned_sections TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// PostgreSQL-backed credential store. Every call is bounded by the
/// configured timeout; a timeout is an availability error, never an
/// authentication failure.
pub struct PgCredentialStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgCredentialStore {
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_millis(cfg.query_timeout_ms))
            .connect(&cfg.url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("connected to credential store");
        Ok(Self {
            pool,
            timeout: Duration::from_millis(cfg.query_timeout_ms),
        })
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(ACCOUNTS_DDL).execute(&self.pool).await?;
        sqlx::query(ADMINS_DDL).execute(&self.pool).await?;
        Ok(())
    }

    async fn guard<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(map_sqlx),
            Err(_) => Err(StoreError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let field = match db.constraint() {
                Some(c) if c.contains("email") => "email",
                Some(c) if c.contains("username") => "username",
                _ => "unique field",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.guard(async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        self.guard(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.guard(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
                .bind(email.to_lowercase())
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.guard(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        self.guard(
            sqlx::query_as::<_, Account>(
                r#"
                INSERT INTO accounts (id, email, username, password_hash, role, first_name, last_name)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(new.email.to_lowercase())
            .bind(new.username)
            .bind(new.password_hash)
            .bind(new.role.as_str())
            .bind(new.first_name)
            .bind(new.last_name)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn update_account_profile(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StoreError> {
        self.guard(
            sqlx::query_as::<_, Account>(
                r#"
                UPDATE accounts SET
                    first_name = COALESCE($2, first_name),
                    last_name = COALESCE($3, last_name),
                    updated_at = $4
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(Utc::now())
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn list_accounts(
        &self,
        query: AccountQuery,
    ) -> Result<(Vec<Account>, i64), StoreError> {
        let role = query.role.map(|r| r.as_str().to_string());
        let pattern = query.search.map(|s| format!("%{}%", s));
        let limit = query.limit.clamp(1, 100);
        let offset = (query.page.max(1) - 1) * limit;

        const FILTER: &str = r#"
            ($1::text IS NULL OR role = $1)
            AND ($2::text IS NULL OR username ILIKE $2 OR email ILIKE $2
                 OR first_name ILIKE $2 OR last_name ILIKE $2)
        "#;

        let rows = self
            .guard(
                sqlx::query_as::<_, Account>(&format!(
                    "SELECT * FROM accounts WHERE {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
                    FILTER
                ))
                .bind(role.clone())
                .bind(pattern.clone())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool),
            )
            .await?;

        let total = self
            .guard(
                sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM accounts WHERE {}",
                    FILTER
                ))
                .bind(role)
                .bind(pattern)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok((rows, total))
    }

    async fn set_account_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<Account>, StoreError> {
        self.guard(
            sqlx::query_as::<_, Account>(
                "UPDATE accounts SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = self
            .guard(
                sqlx::query("DELETE FROM accounts WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>, StoreError> {
        self.guard(
            sqlx::query_as::<_, AdminAccount>("SELECT * FROM admins WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError> {
        self.guard(
            sqlx::query_as::<_, AdminAccount>("SELECT * FROM admins WHERE email = $1")
                .bind(email.to_lowercase())
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, StoreError> {
        self.guard(
            sqlx::query_as::<_, AdminAccount>("SELECT * FROM admins WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert_admin(&self, new: NewAdminAccount) -> Result<AdminAccount, StoreError> {
        self.guard(
            sqlx::query_as::<_, AdminAccount>(
                r#"
                INSERT INTO admins
                    (id, email, username, password_hash, first_name, last_name, role, phone, assigned_sections)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(new.email.to_lowercase())
            .bind(new.username)
            .bind(new.password_hash)
            .bind(new.first_name)
            .bind(new.last_name)
            .bind(new.role.as_str())
            .bind(new.phone)
            .bind(new.assigned_sections)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn list_admins(&self) -> Result<Vec<AdminAccount>, StoreError> {
        self.guard(
            sqlx::query_as::<_, AdminAccount>("SELECT * FROM admins ORDER BY created_at DESC")
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn record_admin_failure(
        &self,
        id: Uuid,
        policy: &LockoutPolicy,
    ) -> Result<Option<AdminAccount>, StoreError> {
        let now = Utc::now();
        // One statement so the whole transition is atomic per account; every
        // CASE sees the pre-update row.
        self.guard(
            sqlx::query_as::<_, AdminAccount>(
                r#"
                UPDATE admins SET
                    login_attempts = CASE
                        WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN 1
                        ELSE login_attempts + 1
                    END,
                    locked_until = CASE
                        WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN NULL
                        WHEN locked_until IS NULL AND login_attempts + 1 >= $3 THEN $4
                        ELSE locked_until
                    END,
                    updated_at = $2
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(now)
            .bind(policy.max_attempts as i32)
            .bind(now + policy.lock_duration)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn record_admin_success(&self, id: Uuid) -> Result<(), StoreError> {
        let now = Utc::now();
        self.guard(async {
            sqlx::query(
                r#"
                UPDATE admins SET
                    login_attempts = 0,
                    locked_until = NULL,
                    last_login_at = $2,
                    updated_at = $2
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;
            Ok(())
        })
        .await
    }

    async fn update_admin_profile(
        &self,
        id: Uuid,
        changes: AdminChanges,
    ) -> Result<Option<AdminAccount>, StoreError> {
        self.guard(
            sqlx::query_as::<_, AdminAccount>(
                r#"
                UPDATE admins SET
                    first_name = COALESCE($2, first_name),
                    last_name = COALESCE($3, last_name),
                    phone = COALESCE($4, phone),
                    profile_picture = COALESCE($5, profile_picture),
                    updated_at = $6
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.phone)
            .bind(changes.profile_picture)
            .bind(Utc::now())
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn update_admin_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = self
            .guard(
                sqlx::query("UPDATE admins SET password_hash = $2, updated_at = $3 WHERE id = $1")
                    .bind(id)
                    .bind(password_hash)
                    .bind(Utc::now())
                    .execute(&self.pool),
            )
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_admin_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<AdminAccount>, StoreError> {
        self.guard(
            sqlx::query_as::<_, AdminAccount>(
                "UPDATE admins SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .fetch_optional(&self.pool),
        )
        .await
    }
}
