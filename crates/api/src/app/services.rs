//! Service wiring: credential issuing over the account store, plus the
//! owned-resource stores shared by the route handlers.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use fintrack_auth::{
    CsrfTokenService, Principal, SessionTokenService,
    password::{check_password_strength, hash_password, verify_password},
};
use fintrack_core::{Budget, CoreError, Expense, ExpenseId, Issue};
use fintrack_store::{
    Account, AccountStore, InMemoryAccountStore, InMemoryOwnedStore, InMemorySingletonStore,
    OwnedStore, SingletonStore,
};

const MAX_EMAIL_LEN: usize = 254;

/// Credential failure taxonomy. Deliberately coarse: unknown email and
/// wrong password collapse into one variant, and duplicate email carries no
/// message of its own.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("validation failed")]
    Validation(Vec<Issue>),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    Conflict,

    #[error("credential processing failed")]
    Internal,
}

/// Verifies registration/login credentials and issues session tokens.
#[derive(Clone)]
pub struct CredentialService {
    accounts: Arc<dyn AccountStore>,
    tokens: SessionTokenService,
    /// Verified against when the email lookup misses, so login cost does
    /// not depend on whether the account exists.
    dummy_hash: String,
}

impl CredentialService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: SessionTokenService,
    ) -> anyhow::Result<Self> {
        let dummy_hash = hash_password("fintrack-timing-equalizer")?;
        Ok(Self {
            accounts,
            tokens,
            dummy_hash,
        })
    }

    /// Create an account. Fails with the same generic surface whether the
    /// email is taken or hashing failed.
    pub fn register(&self, email: &str, password: &str) -> Result<Principal, CredentialError> {
        let email = normalize_email(email);

        let mut issues = check_email(&email);
        issues.extend(check_password_strength(password));
        if !issues.is_empty() {
            return Err(CredentialError::Validation(issues));
        }

        let password_hash = hash_password(password).map_err(|e| {
            tracing::error!(error = %e, "password hashing failed during registration");
            CredentialError::Internal
        })?;

        let account = Account {
            id: fintrack_core::UserId::new(),
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        let principal = Principal::new(account.id, email);

        match self.accounts.insert_if_absent(account) {
            Ok(()) => Ok(principal),
            Err(CoreError::Conflict(_)) => Err(CredentialError::Conflict),
            Err(e) => {
                tracing::error!(error = %e, "account store failed during registration");
                Err(CredentialError::Internal)
            }
        }
    }

    /// Exchange credentials for a signed token. Unknown email and wrong
    /// password are the same error.
    pub fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, Principal), CredentialError> {
        let email = normalize_email(email);

        let (hash, account) = match self.accounts.find_by_email(&email) {
            Some(account) => (account.password_hash.clone(), Some(account)),
            None => (self.dummy_hash.clone(), None),
        };

        let verified = verify_password(&hash, password);
        let Some(account) = account else {
            return Err(CredentialError::InvalidCredentials);
        };
        if !verified {
            return Err(CredentialError::InvalidCredentials);
        }

        let principal = Principal::new(account.id, account.email);
        let token = self.tokens.issue(&principal, Utc::now()).map_err(|e| {
            tracing::error!(error = %e, "token issuance failed during login");
            CredentialError::Internal
        })?;

        Ok((token, principal))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str) -> Vec<Issue> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
                && email.len() <= MAX_EMAIL_LEN
        }
        None => false,
    };

    if valid {
        Vec::new()
    } else {
        vec![Issue::new("email", "invalid email address")]
    }
}

/// Everything the route handlers need, injected as one extension.
pub struct AppServices {
    pub credentials: CredentialService,
    pub csrf: CsrfTokenService,
    pub expenses: Arc<dyn OwnedStore<ExpenseId, Expense>>,
    pub budgets: Arc<dyn SingletonStore<Budget>>,
    pub cookie_secure: bool,
}

impl AppServices {
    pub fn new(
        tokens: SessionTokenService,
        csrf: CsrfTokenService,
        cookie_secure: bool,
    ) -> anyhow::Result<Self> {
        let accounts: Arc<dyn AccountStore> = Arc::new(InMemoryAccountStore::new());
        let credentials = CredentialService::new(accounts, tokens)?;

        Ok(Self {
            credentials,
            csrf,
            expenses: Arc::new(InMemoryOwnedStore::new()),
            budgets: Arc::new(InMemorySingletonStore::new()),
            cookie_secure,
        })
    }
}
