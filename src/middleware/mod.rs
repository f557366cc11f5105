pub mod auth;
pub mod response;

pub use auth::{require_admin, require_capability, require_user, AUTH_HEADER};
pub use response::{ApiResponse, ApiResult};
