//! Expense records — the primary owned resource.
//!
//! An expense always belongs to exactly one owner; the owner is stamped at
//! creation from the authenticated principal and never read from client
//! input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Issue};
use crate::id::{ExpenseId, UserId};

const MAX_DESCRIPTION_LEN: usize = 200;

/// Spending category for an expense.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Housing,
    Utilities,
    Entertainment,
    Health,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Other => "other",
        }
    }
}

/// A recorded expense.
///
/// # Invariants
/// - `owner` is immutable after creation.
/// - `amount_cents` is strictly positive.
/// - `description` is trimmed, non-empty, and bounded in length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner: UserId,
    pub description: String,
    pub amount_cents: i64,
    pub category: Category,
    pub incurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated input for creating an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount_cents: i64,
    pub category: Category,
    pub incurred_on: NaiveDate,
}

/// Partial update for an expense. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    pub category: Option<Category>,
    pub incurred_on: Option<NaiveDate>,
}

fn check_description(value: &str, issues: &mut Vec<Issue>) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        issues.push(Issue::new("description", "description cannot be empty"));
    } else if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        issues.push(Issue::new(
            "description",
            format!("description cannot exceed {MAX_DESCRIPTION_LEN} characters"),
        ));
    }
}

fn check_amount(value: i64, issues: &mut Vec<Issue>) {
    if value <= 0 {
        issues.push(Issue::new("amount_cents", "amount must be positive"));
    }
}

impl Expense {
    /// Validate a draft and create the expense, stamping `owner` from the
    /// caller's resolved principal.
    pub fn create(
        owner: UserId,
        draft: ExpenseDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let mut issues = Vec::new();
        check_description(&draft.description, &mut issues);
        check_amount(draft.amount_cents, &mut issues);
        if !issues.is_empty() {
            return Err(CoreError::Validation(issues));
        }

        Ok(Self {
            id: ExpenseId::new(),
            owner,
            description: draft.description.trim().to_string(),
            amount_cents: draft.amount_cents,
            category: draft.category,
            incurred_on: draft.incurred_on,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a pre-validated update in place.
    ///
    /// Callers must run [`ExpenseUpdate::validate`] first; this keeps the
    /// mutation itself infallible so it can run inside an atomic
    /// match-and-modify storage operation.
    pub fn apply(&mut self, update: &ExpenseUpdate, now: DateTime<Utc>) {
        if let Some(description) = &update.description {
            self.description = description.trim().to_string();
        }
        if let Some(amount_cents) = update.amount_cents {
            self.amount_cents = amount_cents;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(incurred_on) = update.incurred_on {
            self.incurred_on = incurred_on;
        }
        self.updated_at = now;
    }
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount_cents.is_none()
            && self.category.is_none()
            && self.incurred_on.is_none()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let mut issues = Vec::new();
        if let Some(description) = &self.description {
            check_description(description, &mut issues);
        }
        if let Some(amount_cents) = self.amount_cents {
            check_amount(amount_cents, &mut issues);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(issues))
        }
    }
}
