//! HTTP API application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: credential service + owned-resource store wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: the single error-to-envelope boundary

use std::sync::Arc;

use axum::{Extension, Router};

use fintrack_auth::{CsrfTokenService, SessionTokenService};

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Requests are handled with no shared mutable session state: any instance
/// built from the same secret verifies any token.
pub fn build_app(config: &Config) -> anyhow::Result<Router> {
    let tokens = SessionTokenService::new(config.session_secret.clone())?;
    let csrf = CsrfTokenService::new(config.session_secret.clone());

    let services = Arc::new(services::AppServices::new(
        tokens.clone(),
        csrf.clone(),
        config.cookie_secure,
    )?);
    let auth_state = middleware::AuthState { tokens, csrf };

    // Public surface: CSRF stage only (mutating verbs).
    let public = routes::public_router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::csrf_gate,
        ));

    // Owned resources: CSRF stage, then token verification, then principal
    // binding; no handler runs if either stage fails.
    let protected = routes::protected_router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_gate,
        ));

    Ok(Router::new().merge(public).merge(protected))
}
