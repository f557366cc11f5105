use std::sync::Arc;

use chrono::Duration;

use crate::auth::lockout::LockoutPolicy;
use crate::auth::token::TokenCodec;
use crate::config::{AppConfig, BootstrapConfig};
use crate::database::store::CredentialStore;

/// Shared request-handling state. Everything here is read-only after
/// startup; the store is the only mutable shared resource behind it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: TokenCodec,
    pub lockout: LockoutPolicy,
    pub bcrypt_cost: u32,
    pub bootstrap: BootstrapConfig,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            tokens: TokenCodec::new(
                &config.security.jwt_secret,
                Duration::days(config.security.token_ttl_days),
            ),
            lockout: LockoutPolicy::new(
                config.security.max_login_attempts,
                Duration::hours(config.security.lockout_hours),
            ),
            bcrypt_cost: config.security.bcrypt_cost,
            bootstrap: config.bootstrap.clone(),
        }
    }
}
