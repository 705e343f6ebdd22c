//! Signed session token codec.
//!
//! Tokens are `base64url(payload).base64url(signature)` where the payload is
//! the JSON-encoded [`SessionClaims`] and the signature is HMAC-SHA256 over
//! the encoded payload, keyed by the single process-wide secret. There is no
//! server-side session state: everything needed to rebuild the principal is
//! inside the token, and expiry is the only deauthorization mechanism.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::claims::{SessionClaims, validate_claims};
use crate::principal::Principal;

type HmacSha256 = Hmac<Sha256>;

const MIN_SECRET_LEN: usize = 32;

/// Fixed session lifetime: 7 days.
pub const SESSION_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret is too short (min {MIN_SECRET_LEN} bytes)")]
    SecretTooShort,

    #[error("invalid session token format")]
    InvalidFormat,

    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session token is expired")]
    Expired,

    #[error("failed to decode session token payload")]
    PayloadDecode,

    #[error("failed to parse session token payload")]
    PayloadParse,
}

/// Issues and verifies signed session tokens.
///
/// One instance backs every transport (bearer header and cookie) so the two
/// paths cannot drift apart.
#[derive(Clone)]
pub struct SessionTokenService {
    secret: Arc<[u8]>,
}

impl SessionTokenService {
    pub fn new(secret: Vec<u8>) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::SecretTooShort);
        }

        Ok(Self {
            secret: Arc::<[u8]>::from(secret),
        })
    }

    /// Sign `{id, email}` into a fresh token with the fixed 7-day expiry.
    pub fn issue(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            id: principal.id,
            email: principal.email.clone(),
            issued_at: now,
            expires_at: now + Duration::seconds(SESSION_TOKEN_TTL_SECS),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::PayloadParse)?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let signature = self.sign(payload_b64.as_bytes())?;
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature);
        Ok(format!("{payload_b64}.{signature_b64}"))
    }

    /// The single canonical verification path: signature, payload shape,
    /// time window. Every failure mode is a [`TokenError`]; callers are
    /// expected to collapse them into one uniform authentication rejection.
    pub fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, TokenError> {
        let (payload_b64, signature_b64) = token
            .split_once('.')
            .ok_or(TokenError::InvalidFormat)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::InvalidFormat)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::InvalidSignature)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::PayloadDecode)?;

        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::PayloadParse)?;

        validate_claims(&claims, now)?;

        Ok(claims)
    }

    fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::InvalidSignature)?;
        mac.update(bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
