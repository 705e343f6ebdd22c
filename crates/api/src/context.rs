use fintrack_auth::Principal;
use fintrack_core::UserId;

/// Principal context for a request (authenticated identity).
///
/// Inserted by the authorization gate after token verification; handlers
/// read the owner id from here and never from client-supplied fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.id
    }

    pub fn email(&self) -> &str {
        &self.principal.email
    }
}
