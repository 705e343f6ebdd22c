use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use fintrack_core::{Expense, ExpenseDraft, ExpenseId, ExpenseUpdate, Issue};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::routes::common::parse_body;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_expense).get(list_expenses))
        .route(
            "/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

pub async fn create_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<ExpenseDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = parse_body(body)?;

    // Owner comes from the verified principal; any client-supplied owner
    // field simply does not exist in the draft shape.
    let expense = Expense::create(principal.user_id(), draft, Utc::now())?;
    services
        .expenses
        .insert(principal.user_id(), expense.id, expense.clone());

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "expense": dto::expense_to_json(&expense),
        })),
    ))
}

pub async fn list_expenses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rows = services.expenses.list(principal.user_id());
    rows.sort_by(|a, b| {
        b.incurred_on
            .cmp(&a.incurred_on)
            .then(b.created_at.cmp(&a.created_at))
    });

    let expenses: Vec<_> = rows.iter().map(dto::expense_to_json).collect();
    Ok(Json(serde_json::json!({
        "success": true,
        "expenses": expenses,
    })))
}

pub async fn get_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ExpenseId = id.parse()?;

    let expense = services
        .expenses
        .get(principal.user_id(), &id)
        .ok_or(ApiError::NotFound)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "expense": dto::expense_to_json(&expense),
    })))
}

pub async fn update_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<ExpenseUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ExpenseId = id.parse()?;
    let update = parse_body(body)?;

    if update.is_empty() {
        return Err(ApiError::validation(vec![Issue::new(
            "body",
            "no fields to update",
        )]));
    }
    update.validate()?;

    // Single match-and-modify filtered by (owner, id): an id owned by
    // someone else and an id that never existed produce the same miss.
    let now = Utc::now();
    let updated = services
        .expenses
        .update(principal.user_id(), &id, &mut |e| e.apply(&update, now))
        .ok_or(ApiError::NotFound)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "expense": dto::expense_to_json(&updated),
    })))
}

pub async fn delete_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ExpenseId = id.parse()?;

    if !services.expenses.remove(principal.user_id(), &id) {
        return Err(ApiError::NotFound);
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
