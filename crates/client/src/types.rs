//! Wire-shape views and payloads used by the session client.
//!
//! These deliberately mirror the API's JSON instead of reusing server-side
//! domain types, so the client tracks the wire contract and nothing else.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrincipalView {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpenseView {
    pub id: String,
    pub description: String,
    pub amount_cents: i64,
    pub category: String,
    pub incurred_on: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BudgetView {
    pub month_limit_cents: i64,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewExpense {
    pub description: String,
    pub amount_cents: i64,
    pub category: String,
    /// ISO date, e.g. `2026-03-14`.
    pub incurred_on: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incurred_on: Option<String>,
}
