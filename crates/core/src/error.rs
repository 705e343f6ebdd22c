//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type CoreResult<T> = Result<T, CoreError>;

/// A single field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Path of the offending field (e.g. `"email"`, `"amount_cents"`).
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// ownership-scoped lookups, conflicts). Transport and credential concerns
/// belong to the auth and api layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// One or more input fields failed validation.
    #[error("validation failed")]
    Validation(Vec<Issue>),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The resource does not exist under the calling owner. Ownership
    /// mismatch and plain absence are deliberately the same variant.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated (e.g. duplicate registration).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    pub fn validation(issues: Vec<Issue>) -> Self {
        Self::Validation(issues)
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
