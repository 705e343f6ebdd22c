use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Resolve the caller's principal from the verified token (either
/// transport); used by clients to validate a stored session.
pub async fn me(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "principal": dto::principal_to_json(principal.principal()),
    }))
}
