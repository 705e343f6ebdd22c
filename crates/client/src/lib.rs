//! `fintrack-client` — caller-side session client.
//!
//! Owns the session token and CSRF cache for one application instance,
//! attaches both to outgoing requests, and reacts to authentication
//! rejections by clearing local state and raising the session-expiry
//! signal. Sessions are stateless, so all of this is purely local.

pub mod session;
pub mod types;

pub use session::{ClientError, SessionClient};
pub use types::{BudgetView, ExpenseChanges, ExpenseView, NewExpense, PrincipalView};
