//! Monthly budget — a singleton owned resource.
//!
//! Each account has at most one budget row; setting it again converges to
//! the same row (upsert by owner) instead of erroring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Issue};
use crate::id::UserId;

/// The single monthly spending limit for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub owner: UserId,
    pub month_limit_cents: i64,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing the budget.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetUpdate {
    pub month_limit_cents: i64,
}

impl Budget {
    pub fn create(
        owner: UserId,
        update: BudgetUpdate,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        update.validate()?;
        Ok(Self {
            owner,
            month_limit_cents: update.month_limit_cents,
            updated_at: now,
        })
    }
}

impl BudgetUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.month_limit_cents <= 0 {
            return Err(CoreError::Validation(vec![Issue::new(
                "month_limit_cents",
                "monthly limit must be positive",
            )]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_valid_budget() {
        let owner = UserId::new();
        let budget = Budget::create(
            owner,
            BudgetUpdate {
                month_limit_cents: 250_000,
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(budget.owner, owner);
        assert_eq!(budget.month_limit_cents, 250_000);
    }

    #[test]
    fn rejects_non_positive_limit() {
        let err = Budget::create(
            UserId::new(),
            BudgetUpdate {
                month_limit_cents: 0,
            },
            Utc::now(),
        )
        .unwrap_err();

        let CoreError::Validation(issues) = err else {
            panic!("expected validation error");
        };
        assert_eq!(issues[0].path, "month_limit_cents");
    }
}
