use uuid::Uuid;

use crate::database::models::{Account, AdminAccount, AdminRole, UserRole};

/// The resolved, authenticated identity attached to a request. Produced
/// fresh by the auth gate on every request; never cached across requests.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    User(UserPrincipal),
    Admin(AdminPrincipal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPrincipal {
    pub id: Uuid,
    pub role: UserRole,
}

impl UserPrincipal {
    /// Role is taken from the live account record, not from the token; roles
    /// are mutable and the token may be up to a week old.
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            role: account.role,
        }
    }
}

/// Where an admin principal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOrigin {
    /// Backed by a record in the administrative store
    Native,
    /// Synthesized from an ordinary account whose role is `admin`
    Legacy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminPrincipal {
    pub id: Uuid,
    pub role: AdminRole,
    pub sections: Vec<String>,
    pub origin: AdminOrigin,
}

impl AdminPrincipal {
    pub fn from_admin_account(admin: &AdminAccount) -> Self {
        Self {
            id: admin.id,
            role: admin.role,
            sections: admin.assigned_sections.clone(),
            origin: AdminOrigin::Native,
        }
    }

    /// Legacy-fallback bridge: ordinary accounts created before the admin
    /// store existed keep full capability. Fixed super-admin role, no
    /// sections, and nothing is ever written back to either store.
    pub fn from_legacy_account(account: &Account) -> Self {
        Self {
            id: account.id,
            role: AdminRole::SuperAdmin,
            sections: Vec::new(),
            origin: AdminOrigin::Legacy,
        }
    }
}
