//! The single error-to-envelope boundary.
//!
//! Handlers return `Result<_, ApiError>`; this module is the only place a
//! typed failure becomes an HTTP status and the fixed response envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use fintrack_core::{CoreError, Issue};

use crate::app::services::CredentialError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/invalid/expired token, or failed credential exchange.
    #[error("{0}")]
    Authentication(&'static str),

    /// Missing or mismatched CSRF token pair.
    #[error("invalid csrf token")]
    Csrf,

    /// Malformed input against schema, with per-field issues.
    #[error("validation failed")]
    Validation(Vec<Issue>),

    /// Resource absent under the calling owner — deliberately the same
    /// outcome whether the id never existed or belongs to someone else.
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    /// Anything unclassified. The client sees a generic message; the cause
    /// is logged where it happened.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self::Authentication("authentication required")
    }

    pub fn invalid_credentials() -> Self {
        Self::Authentication("invalid credentials")
    }

    pub fn validation(issues: Vec<Issue>) -> Self {
        Self::Validation(issues)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Csrf => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let ApiError::Validation(issues) = &self {
            body["issues"] = json!(issues);
        }

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(issues) => ApiError::Validation(issues),
            CoreError::InvalidId(message) => {
                ApiError::Validation(vec![Issue::new("id", message)])
            }
            CoreError::NotFound => ApiError::NotFound,
            CoreError::Conflict(message) => ApiError::Conflict(message),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(issues) => ApiError::Validation(issues),
            CredentialError::InvalidCredentials => ApiError::invalid_credentials(),
            // Duplicate email: same generic message as the hashing-failure
            // path so the body does not reveal which one happened.
            CredentialError::Conflict => {
                ApiError::Conflict("unable to register account".to_string())
            }
            CredentialError::Internal => ApiError::Internal,
        }
    }
}
