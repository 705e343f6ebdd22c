//! Double-submit CSRF token codec.
//!
//! The token lives in a client-readable cookie and must be echoed verbatim
//! in a request header by same-origin script; a cross-site forger cannot
//! read the cookie to echo it. Tokens are self-authenticating (signed
//! nonce + expiry) so no server-side state is needed to validate them, and
//! they are independent of the session token.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Fixed CSRF token lifetime: 1 hour.
pub const CSRF_TOKEN_TTL_SECS: i64 = 60 * 60;

/// 128 bits of entropy per token.
const NONCE_LEN: usize = 16;

/// Domain-separation tag so a CSRF signature can never double as a session
/// token signature under the shared secret.
const DOMAIN_TAG: &[u8] = b"fintrack-csrf-v1";

#[derive(Debug, thiserror::Error)]
pub enum CsrfError {
    #[error("missing csrf token")]
    Missing,

    #[error("csrf token mismatch")]
    Mismatch,

    #[error("invalid csrf token")]
    Invalid,

    #[error("csrf token is expired")]
    Expired,
}

/// A freshly issued CSRF token plus its expiry (for cookie attributes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates double-submit CSRF tokens.
#[derive(Clone)]
pub struct CsrfTokenService {
    secret: Arc<[u8]>,
}

impl CsrfTokenService {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret: Arc::<[u8]>::from(secret),
        }
    }

    /// Generate a fresh random token. Each issuance rotates the cookie, so
    /// a previously issued header value stops matching from then on.
    pub fn issue(&self, now: DateTime<Utc>) -> Result<CsrfToken, CsrfError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let expires_at = now + Duration::seconds(CSRF_TOKEN_TTL_SECS);

        let mut payload = Vec::with_capacity(NONCE_LEN + 8);
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&expires_at.timestamp().to_be_bytes());

        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload);
        let signature_b64 = URL_SAFE_NO_PAD.encode(self.sign(&payload)?);

        Ok(CsrfToken {
            value: format!("{payload_b64}.{signature_b64}"),
            expires_at,
        })
    }

    /// Validate the header/cookie pair for a mutating request.
    ///
    /// Both must be present and equal (constant-time), and the shared value
    /// must carry an authentic, unexpired signature. This runs before token
    /// verification and before any persistence access.
    pub fn validate(
        &self,
        header: Option<&str>,
        cookie: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), CsrfError> {
        let header = header.ok_or(CsrfError::Missing)?;
        let cookie = cookie.ok_or(CsrfError::Missing)?;

        if !bool::from(header.as_bytes().ct_eq(cookie.as_bytes())) {
            return Err(CsrfError::Mismatch);
        }

        self.check(header, now)
    }

    fn check(&self, value: &str, now: DateTime<Utc>) -> Result<(), CsrfError> {
        let (payload_b64, signature_b64) =
            value.split_once('.').ok_or(CsrfError::Invalid)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CsrfError::Invalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| CsrfError::Invalid)?;

        let expected = self.sign(&payload)?;
        if !bool::from(expected.ct_eq(&signature)) {
            return Err(CsrfError::Invalid);
        }

        if payload.len() != NONCE_LEN + 8 {
            return Err(CsrfError::Invalid);
        }
        let mut ts_bytes = [0u8; 8];
        ts_bytes.copy_from_slice(&payload[NONCE_LEN..]);
        let expires_at = Utc
            .timestamp_opt(i64::from_be_bytes(ts_bytes), 0)
            .single()
            .ok_or(CsrfError::Invalid)?;

        if now >= expires_at {
            return Err(CsrfError::Expired);
        }

        Ok(())
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, CsrfError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| CsrfError::Invalid)?;
        mac.update(DOMAIN_TAG);
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
