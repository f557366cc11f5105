use crate::database::models::{AdminRole, UserRole};

use super::principal::Principal;

/// Permission level a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Ordinary routes open to any of the listed account roles
    OrdinaryRoles(&'static [UserRole]),
    /// Any administrative principal, native or legacy-synthesized
    AdministrativeAccess,
    /// Managing other admin accounts; super-admin role only
    SuperAdminOps,
}

/// Answer whether `principal` satisfies `required`. Legacy-synthesized
/// super-admins are indistinguishable from native ones at this layer.
pub fn satisfies(principal: &Principal, required: Capability) -> bool {
    match (principal, required) {
        (Principal::User(user), Capability::OrdinaryRoles(allowed)) => allowed.contains(&user.role),
        (Principal::User(_), Capability::AdministrativeAccess) => false,
        (Principal::User(_), Capability::SuperAdminOps) => false,
        (Principal::Admin(_), Capability::AdministrativeAccess) => true,
        (Principal::Admin(admin), Capability::SuperAdminOps) => admin.role == AdminRole::SuperAdmin,
        // Admin-store principals do not stand in for ordinary account roles
        (Principal::Admin(_), Capability::OrdinaryRoles(_)) => false,
    }
}
