pub mod account;
pub mod admin;
pub mod role;

pub use account::Account;
pub use admin::{AdminAccount, Permission};
pub use role::{AdminRole, ParseRoleError, UserRole};
