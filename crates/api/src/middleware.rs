//! Authorization gate middleware.
//!
//! Composes, in order: CSRF guard (mutating verbs only) → token
//! verification → principal binding. Either failure terminates the request
//! before any handler or persistence code runs. One canonical `verify`
//! backs both token transports (bearer header and httpOnly cookie).

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use fintrack_auth::{CsrfTokenService, SessionTokenService};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;
use crate::cookies::{self, CSRF_COOKIE, CSRF_HEADER, TOKEN_COOKIE};

#[derive(Clone)]
pub struct AuthState {
    pub tokens: SessionTokenService,
    pub csrf: CsrfTokenService,
}

/// Full gate for owned-resource routes: CSRF (mutating verbs), then the
/// session token, then the principal into request extensions.
pub async fn auth_gate(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    guard_csrf(&state, &req)?;

    let token = extract_token(req.headers())?;
    let claims = state.tokens.verify(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        ApiError::unauthenticated()
    })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.into_principal()));

    Ok(next.run(req).await)
}

/// CSRF-only gate for the public routes (register/login/logout run before
/// a session exists but still mutate).
pub async fn csrf_gate(
    State(state): State<AuthState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    guard_csrf(&state, &req)?;
    Ok(next.run(req).await)
}

fn guard_csrf(state: &AuthState, req: &Request<Body>) -> Result<(), ApiError> {
    if !is_mutating(req.method()) {
        return Ok(());
    }

    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok());
    let cookie = cookies::cookie_value(req.headers(), CSRF_COOKIE);

    state.csrf.validate(header, cookie, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "csrf token rejected");
        ApiError::Csrf
    })
}

fn is_mutating(method: &Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

/// Pull the session token out of the request: bearer header for
/// client-driven calls, `token` cookie for server-rendered gating. Both
/// land in the same verification path.
fn extract_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        let header = header.to_str().map_err(|_| ApiError::unauthenticated())?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(ApiError::unauthenticated)?
            .trim();
        if token.is_empty() {
            return Err(ApiError::unauthenticated());
        }
        return Ok(token);
    }

    cookies::cookie_value(headers, TOKEN_COOKIE)
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::unauthenticated)
}
