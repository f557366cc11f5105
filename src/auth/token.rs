use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{AdminRole, UserRole};

/// Verified identity carried by a bearer token. Exactly one of the two wire
/// fields ({"user": …} / {"admin": …}) may be present; anything else is
/// rejected at decode time, not at use time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSubject {
    User { id: Uuid, role: UserRole },
    Admin { id: Uuid, role: AdminRole },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not parseable, not correctly signed, or carrying an invalid payload
    #[error("malformed token")]
    Malformed,

    #[error("expired token")]
    Expired,

    /// Issue-side failure; never produced by `verify`
    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct UserClaim {
    id: Uuid,
    role: UserRole,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminClaim {
    id: Uuid,
    role: AdminRole,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserClaim>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin: Option<AdminClaim>,
    iat: i64,
    exp: i64,
}

/// Stateless signer/verifier for bearer tokens. Holds the process-wide
/// signing secret; never touches the credential store.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, subject: TokenSubject) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = match subject {
            TokenSubject::User { id, role } => Claims {
                user: Some(UserClaim {
                    id,
                    role,
                    kind: "user".into(),
                }),
                admin: None,
                iat: now.timestamp(),
                exp: (now + self.ttl).timestamp(),
            },
            TokenSubject::Admin { id, role } => Claims {
                user: None,
                admin: Some(AdminClaim {
                    id,
                    role,
                    kind: "admin".into(),
                }),
                iat: now.timestamp(),
                exp: (now + self.ttl).timestamp(),
            },
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<TokenSubject, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            },
        )?;

        match (data.claims.user, data.claims.admin) {
            (Some(user), None) => Ok(TokenSubject::User {
                id: user.id,
                role: user.role,
            }),
            (None, Some(admin)) => Ok(TokenSubject::Admin {
                id: admin.id,
                role: admin.role,
            }),
            // Neither or both tags present
            _ => Err(TokenError::Malformed),
        }
    }
}
