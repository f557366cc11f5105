// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::store::StoreError;

/// Uniform message for every token failure. The client must not be able to
/// tell a missing token from a malformed, unsigned, or expired one.
pub const TOKEN_INVALID_MSG: &str = "Token is not valid";

/// Uniform message for login failure. Unknown account and wrong password are
/// deliberately indistinguishable.
pub const INVALID_CREDENTIALS_MSG: &str = "Invalid credentials";

/// HTTP API error with appropriate status codes and client-safe messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),
    InvalidCredentials,
    Conflict(String),

    // 401 Unauthorized
    TokenInvalid,

    // 403 Forbidden
    AccountLocked,
    AccountInactive,
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    Unavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            // Duplicate email/username maps to 400, not 409, to match the
            // wire contract the SPA client was written against.
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::TokenInvalid => StatusCode::UNAUTHORIZED,
            ApiError::AccountLocked => StatusCode::FORBIDDEN,
            ApiError::AccountInactive => StatusCode::FORBIDDEN,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::InvalidCredentials => INVALID_CREDENTIALS_MSG,
            ApiError::Conflict(msg) => msg,
            ApiError::TokenInvalid => TOKEN_INVALID_MSG,
            // No unlock time here; the caller only learns "try again later"
            ApiError::AccountLocked => {
                "Account is locked due to too many failed login attempts. Please try again later."
            }
            ApiError::AccountInactive => "Account is inactive. Please contact support.",
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Internal(msg) => msg,
            ApiError::Unavailable(msg) => msg,
        }
    }

    /// Stable error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TokenInvalid => "TOKEN_INVALID",
            ApiError::AccountLocked => "ACCOUNT_LOCKED",
            ApiError::AccountInactive => "ACCOUNT_INACTIVE",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
            ApiError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        ApiError::Unavailable(message.into())
    }
}

// Store failures surface as availability problems, never as authentication
// failures. Internal detail is logged server-side only.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                ApiError::conflict(format!("Value for '{}' is already taken", field))
            }
            StoreError::Timeout(ms) => {
                tracing::error!("credential store call timed out after {}ms", ms);
                ApiError::unavailable("Service temporarily unavailable")
            }
            StoreError::Connection(msg) => {
                tracing::error!("credential store connection error: {}", msg);
                ApiError::unavailable("Service temporarily unavailable")
            }
            StoreError::Query(msg) => {
                tracing::error!("credential store query error: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
            StoreError::Sqlx(e) => {
                tracing::error!("credential store error: {}", e);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::auth::token::TokenError> for ApiError {
    fn from(err: crate::auth::token::TokenError) -> Self {
        use crate::auth::token::TokenError;
        match err {
            TokenError::Malformed | TokenError::Expired => ApiError::TokenInvalid,
            TokenError::Signing(msg) => {
                tracing::error!("token signing failed: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::auth::password::PasswordError> for ApiError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        tracing::error!("password hashing failure: {}", err);
        ApiError::internal("An error occurred while processing your request")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
