use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fintrack_core::{CoreError, UserId};

/// A credential record. The password hash is opaque to everything except
/// the auth crate's verify function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    /// Normalized (trimmed, lowercased) at registration time; the map key.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Credential records keyed by normalized email.
pub trait AccountStore: Send + Sync {
    /// Insert the account unless one already exists for its email; the
    /// check and insert are one atomic step.
    fn insert_if_absent(&self, account: Account) -> Result<(), CoreError>;

    fn find_by_email(&self, email: &str) -> Option<Account>;
}

impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    fn insert_if_absent(&self, account: Account) -> Result<(), CoreError> {
        (**self).insert_if_absent(account)
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        (**self).find_by_email(email)
    }
}

/// In-memory account store for dev/tests.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn insert_if_absent(&self, account: Account) -> Result<(), CoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| CoreError::conflict("account store poisoned"))?;

        if map.contains_key(&account.email) {
            return Err(CoreError::conflict("email already registered"));
        }
        map.insert(account.email.clone(), account);
        Ok(())
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        let map = self.inner.read().ok()?;
        map.get(email).cloned()
    }
}
