use std::env;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Bound applied to every credential store call
    pub query_timeout_ms: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    /// Token signing secret. Required; there is no built-in fallback.
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub max_login_attempts: u32,
    pub lockout_hours: i64,
}

#[derive(Clone)]
pub struct BootstrapConfig {
    pub admin_email: String,
    pub admin_password: String,
}

// Secrets stay out of Debug output
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_days", &self.token_ttl_days)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("max_login_attempts", &self.max_login_attempts)
            .field("lockout_hours", &self.lockout_hours)
            .finish()
    }
}

impl fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the environment. Required variables with no
    /// usable fallback: DATABASE_URL, JWT_SECRET, ADMIN_EMAIL, ADMIN_PASS.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig {
                port: parsed("PORT", 3000)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10)?,
                query_timeout_ms: parsed("STORE_TIMEOUT_MS", 5000)?,
            },
            security: SecurityConfig {
                jwt_secret: required("JWT_SECRET")?,
                token_ttl_days: parsed("TOKEN_TTL_DAYS", 7)?,
                bcrypt_cost: parsed("BCRYPT_COST", 12)?,
                max_login_attempts: parsed("MAX_LOGIN_ATTEMPTS", 5)?,
                lockout_hours: parsed("LOCKOUT_HOURS", 2)?,
            },
            bootstrap: BootstrapConfig {
                admin_email: required("ADMIN_EMAIL")?.to_lowercase(),
                admin_password: required("ADMIN_PASS")?,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) => v
            .parse()
            .map_err(|_| ConfigError::Invalid(name, v.clone())),
        Err(_) => Ok(default),
    }
}
