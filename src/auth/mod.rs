pub mod capability;
pub mod lockout;
pub mod password;
pub mod principal;
pub mod token;

pub use capability::{satisfies, Capability};
pub use lockout::{FailureTransition, LockoutPolicy};
pub use principal::{AdminOrigin, AdminPrincipal, Principal, UserPrincipal};
pub use token::{TokenCodec, TokenError, TokenSubject};
