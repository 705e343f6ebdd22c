use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use fintrack_core::{Budget, BudgetUpdate};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::routes::common::parse_body;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route(
        "/",
        get(get_budget).put(put_budget).delete(delete_budget),
    )
}

pub async fn get_budget(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<impl IntoResponse, ApiError> {
    let budget = services
        .budgets
        .get(principal.user_id())
        .ok_or(ApiError::NotFound)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "budget": dto::budget_to_json(&budget),
    })))
}

/// Upsert keyed by owner: repeated calls converge to the single budget row
/// rather than erroring.
pub async fn put_budget(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<BudgetUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let update = parse_body(body)?;

    let budget = Budget::create(principal.user_id(), update, Utc::now())?;
    let budget = services.budgets.upsert(principal.user_id(), budget);

    Ok(Json(serde_json::json!({
        "success": true,
        "budget": dto::budget_to_json(&budget),
    })))
}

pub async fn delete_budget(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<impl IntoResponse, ApiError> {
    if !services.budgets.remove(principal.user_id()) {
        return Err(ApiError::NotFound);
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
