//! `fintrack-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token and
//! CSRF codecs, claim validation, and password hashing, all invocable
//! identically from any transport.

pub mod claims;
pub mod csrf;
pub mod password;
pub mod principal;
pub mod token;

pub use claims::{SessionClaims, validate_claims};
pub use csrf::{CSRF_TOKEN_TTL_SECS, CsrfError, CsrfToken, CsrfTokenService};
pub use principal::Principal;
pub use token::{SESSION_TOKEN_TTL_SECS, SessionTokenService, TokenError};
