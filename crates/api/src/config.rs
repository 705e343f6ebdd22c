//! Environment-driven process configuration.
//!
//! The signing secret is read exactly once at startup and is immutable for
//! the process lifetime. A missing or short secret aborts startup; there is
//! no runtime fallback.

use thiserror::Error;

/// Minimum length of the shared signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const SECRET_VAR: &str = "FINTRACK_SESSION_SECRET";
const BIND_ADDR_VAR: &str = "FINTRACK_BIND_ADDR";
const COOKIE_SECURE_VAR: &str = "FINTRACK_COOKIE_SECURE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{SECRET_VAR} must be set")]
    MissingSecret,

    #[error("{SECRET_VAR} must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,

    #[error("invalid {COOKIE_SECURE_VAR} value: {0} (expected true or false)")]
    InvalidCookieSecure(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Shared HMAC secret for session and CSRF tokens. Any instance holding
    /// this secret can verify any token, which is what makes the fleet
    /// horizontally scalable.
    pub session_secret: Vec<u8>,

    pub bind_addr: String,

    /// `Secure` attribute on issued cookies. Defaults on; switch off only
    /// for local development over plain HTTP.
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var(SECRET_VAR).map_err(|_| ConfigError::MissingSecret)?;
        Self::build(
            secret,
            std::env::var(BIND_ADDR_VAR).ok(),
            std::env::var(COOKIE_SECURE_VAR).ok(),
        )
    }

    fn build(
        secret: String,
        bind_addr: Option<String>,
        cookie_secure: Option<String>,
    ) -> Result<Self, ConfigError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        let cookie_secure = match cookie_secure.as_deref() {
            None => true,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => return Err(ConfigError::InvalidCookieSecure(other.to_string())),
        };

        Ok(Self {
            session_secret: secret.into_bytes(),
            bind_addr: bind_addr.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cookie_secure,
        })
    }
}
