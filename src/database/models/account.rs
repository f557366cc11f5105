use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// Ordinary principal record. Email is stored lowercase; uniqueness of email
/// and username holds within this store only, independently of the admin
/// store.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_account_omits_password_hash() {
        let account = Account {
            id: Uuid::new_v4(),
            email: "p@example.com".into(),
            username: "pat".into(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
            role: UserRole::Patient,
            first_name: None,
            last_name: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "patient");
        assert_eq!(value["isActive"], true);
    }
}
