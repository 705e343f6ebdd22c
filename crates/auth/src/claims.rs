use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fintrack_core::UserId;

use crate::principal::Principal;
use crate::token::TokenError;

/// Session token claims model (transport-agnostic).
///
/// This is the full set of claims a token carries once decoded/verified;
/// signature checking is the codec's job, time-window checking happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / account identifier.
    pub id: UserId,

    /// Email at issuance time.
    pub email: String,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            email: self.email,
        }
    }
}

/// Deterministically validate the claim time window.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::Expired);
    }
    if now < claims.issued_at {
        return Err(TokenError::Expired);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}
