use serde::{Deserialize, Serialize};

use fintrack_core::UserId;

/// Identity of an authenticated caller for the lifetime of one request.
///
/// A `Principal` is only ever constructed from claims that passed
/// verification in that same request; it is never persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub email: String,
}

impl Principal {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}
