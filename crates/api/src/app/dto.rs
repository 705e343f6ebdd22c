use serde::Deserialize;

use fintrack_auth::Principal;
use fintrack_core::{Budget, Expense};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn principal_to_json(principal: &Principal) -> serde_json::Value {
    serde_json::json!({
        "id": principal.id.to_string(),
        "email": principal.email,
    })
}

pub fn expense_to_json(expense: &Expense) -> serde_json::Value {
    serde_json::json!({
        "id": expense.id.to_string(),
        "description": expense.description,
        "amount_cents": expense.amount_cents,
        "category": expense.category.as_str(),
        "incurred_on": expense.incurred_on.to_string(),
        "created_at": expense.created_at.to_rfc3339(),
        "updated_at": expense.updated_at.to_rfc3339(),
    })
}

pub fn budget_to_json(budget: &Budget) -> serde_json::Value {
    serde_json::json!({
        "month_limit_cents": budget.month_limit_cents,
        "updated_at": budget.updated_at.to_rfc3339(),
    })
}
