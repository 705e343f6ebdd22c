use axum::{Router, routing::get};

pub mod auth;
pub mod budget;
pub mod common;
pub mod expenses;
pub mod system;

/// Router for the public surface (no principal required). Mutating routes
/// here are still CSRF-guarded.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/auth", auth::router())
}

/// Router for owned-resource endpoints, all behind the full gate.
pub fn protected_router() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .nest("/expenses", expenses::router())
        .nest("/budget", budget::router())
}
