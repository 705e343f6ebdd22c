use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use fintrack_auth::{CSRF_TOKEN_TTL_SECS, SESSION_TOKEN_TTL_SECS};

use crate::app::dto::{self, LoginRequest, RegisterRequest};
use crate::app::errors::ApiError;
use crate::app::routes::common::parse_body;
use crate::app::services::AppServices;
use crate::cookies;

pub fn router() -> Router {
    Router::new()
        .route("/csrf", get(issue_csrf))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Session bootstrap: rotate the CSRF cookie and hand the value back for
/// the caller to echo in `x-csrf-token`.
pub async fn issue_csrf(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = services.csrf.issue(Utc::now()).map_err(|e| {
        tracing::error!(error = %e, "csrf issuance failed");
        ApiError::Internal
    })?;

    let cookie = cookies::csrf_cookie(&token.value, CSRF_TOKEN_TTL_SECS, services.cookie_secure)
        .map_err(|e| {
            tracing::error!(error = %e, "csrf cookie construction failed");
            ApiError::Internal
        })?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({
            "success": true,
            "csrf_token": token.value,
        })),
    ))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = parse_body(body)?;

    let principal = services.credentials.register(&body.email, &body.password)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "principal": dto::principal_to_json(&principal),
        })),
    ))
}

/// Exchange credentials for a signed token. The token is returned in the
/// body for bearer use and set as an httpOnly cookie for server-rendered
/// gating; both transports verify through the same path.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = parse_body(body)?;

    let (token, principal) = services.credentials.login(&body.email, &body.password)?;

    let cookie = cookies::token_cookie(&token, SESSION_TOKEN_TTL_SECS, services.cookie_secure)
        .map_err(|e| {
            tracing::error!(error = %e, "token cookie construction failed");
            ApiError::Internal
        })?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({
            "success": true,
            "token": token,
            "principal": dto::principal_to_json(&principal),
        })),
    ))
}

/// Sessions are stateless, so logout only clears the cookie transport;
/// bearer callers discard their copy locally.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<impl IntoResponse, ApiError> {
    let cookie = cookies::clear_token_cookie(services.cookie_secure).map_err(|e| {
        tracing::error!(error = %e, "token cookie construction failed");
        ApiError::Internal
    })?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "success": true })),
    ))
}
