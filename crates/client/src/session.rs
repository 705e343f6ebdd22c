use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tokio::sync::watch;

use crate::types::{BudgetView, ExpenseChanges, ExpenseView, NewExpense, PrincipalView};

const CSRF_HEADER: &str = "x-csrf-token";

/// Refresh the cached CSRF token ahead of its 1-hour server-side expiry.
const CSRF_REFRESH_AFTER: Duration = Duration::from_secs(55 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The call was rejected with a 401. Local session state has already
    /// been cleared and the expiry signal raised.
    #[error("session expired")]
    SessionExpired,

    /// A 403, typically a stale CSRF pair. Recoverable by re-running
    /// [`SessionClient::bootstrap`]; never retried automatically.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("api error {0}: {1}")]
    Api(u16, String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    principal: Option<PrincipalView>,
    csrf: Option<CachedCsrf>,
}

struct CachedCsrf {
    value: String,
    fetched_at: Instant,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    state: Mutex<SessionState>,
    expired_tx: watch::Sender<u64>,
}

/// The session owner for one application instance.
///
/// Cheap to clone; all clones share token, CSRF cache, and the expiry
/// signal.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Inner>,
}

impl SessionClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let (expired_tx, _keepalive) = watch::channel(0u64);

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                state: Mutex::new(SessionState::default()),
                expired_tx,
            }),
        })
    }

    /// Subscribe to the session-expiry signal. The counter increments once
    /// per call that observed a 401; raising it repeatedly is safe.
    pub fn subscribe_expiry(&self) -> watch::Receiver<u64> {
        self.inner.expired_tx.subscribe()
    }

    pub fn principal(&self) -> Option<PrincipalView> {
        self.inner.state.lock().ok()?.principal.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.lock().ok()?.token.clone()
    }

    /// Ensure a fresh CSRF token is cached, then validate any stored
    /// session token against the principal-resolution endpoint. Local
    /// state is cleared when the stored token no longer verifies.
    pub async fn bootstrap(&self) -> Result<(), ClientError> {
        self.ensure_csrf().await?;

        if self.token().is_some() {
            match self.me().await {
                Ok(_) => {}
                // The stored token was rejected: state is already cleared,
                // bootstrap itself still succeeds.
                Err(ClientError::SessionExpired) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Register a new account. Bootstraps first so the mutating call has a
    /// CSRF token to carry.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PrincipalView, ClientError> {
        self.bootstrap().await?;

        let body = self
            .request(
                Method::POST,
                "/auth/register",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        parse_field(&body, "principal")
    }

    /// Exchange credentials for a token and persist it locally.
    pub async fn login(&self, email: &str, password: &str) -> Result<PrincipalView, ClientError> {
        self.bootstrap().await?;

        let body = self
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        let token = body["token"]
            .as_str()
            .ok_or_else(|| ClientError::Parse("missing token in login response".to_string()))?
            .to_string();
        let principal: PrincipalView = parse_field(&body, "principal")?;

        if let Ok(mut state) = self.inner.state.lock() {
            state.token = Some(token);
            state.principal = Some(principal.clone());
        }

        Ok(principal)
    }

    /// Purely local: sessions are stateless, so discarding the token is the
    /// whole logout.
    pub fn logout(&self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.token = None;
            state.principal = None;
        }
    }

    /// Resolve (and cache) the principal for the stored token.
    pub async fn me(&self) -> Result<PrincipalView, ClientError> {
        let body = self.request(Method::GET, "/me", None).await?;
        let principal: PrincipalView = parse_field(&body, "principal")?;

        if let Ok(mut state) = self.inner.state.lock() {
            state.principal = Some(principal.clone());
        }

        Ok(principal)
    }

    pub async fn list_expenses(&self) -> Result<Vec<ExpenseView>, ClientError> {
        let body = self.request(Method::GET, "/expenses", None).await?;
        parse_field(&body, "expenses")
    }

    pub async fn create_expense(&self, new: &NewExpense) -> Result<ExpenseView, ClientError> {
        let payload =
            serde_json::to_value(new).map_err(|e| ClientError::Parse(e.to_string()))?;
        let body = self
            .request(Method::POST, "/expenses", Some(payload))
            .await?;
        parse_field(&body, "expense")
    }

    pub async fn update_expense(
        &self,
        id: &str,
        changes: &ExpenseChanges,
    ) -> Result<ExpenseView, ClientError> {
        let payload =
            serde_json::to_value(changes).map_err(|e| ClientError::Parse(e.to_string()))?;
        let body = self
            .request(Method::PUT, &format!("/expenses/{id}"), Some(payload))
            .await?;
        parse_field(&body, "expense")
    }

    pub async fn delete_expense(&self, id: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, &format!("/expenses/{id}"), None)
            .await?;
        Ok(())
    }

    /// The budget is a singleton; absence reads as `None` rather than an
    /// error.
    pub async fn budget(&self) -> Result<Option<BudgetView>, ClientError> {
        match self.request(Method::GET, "/budget", None).await {
            Ok(body) => Ok(Some(parse_field(&body, "budget")?)),
            Err(ClientError::Api(404, _)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn set_budget(&self, month_limit_cents: i64) -> Result<BudgetView, ClientError> {
        let body = self
            .request(
                Method::PUT,
                "/budget",
                Some(json!({ "month_limit_cents": month_limit_cents })),
            )
            .await?;
        parse_field(&body, "budget")
    }

    async fn ensure_csrf(&self) -> Result<String, ClientError> {
        let cached = self.inner.state.lock().ok().and_then(|state| {
            state
                .csrf
                .as_ref()
                .filter(|c| c.fetched_at.elapsed() < CSRF_REFRESH_AFTER)
                .map(|c| c.value.clone())
        });
        if let Some(value) = cached {
            return Ok(value);
        }

        let body = self.request(Method::GET, "/auth/csrf", None).await?;
        let value = body["csrf_token"]
            .as_str()
            .ok_or_else(|| ClientError::Parse("missing csrf_token".to_string()))?
            .to_string();

        if let Ok(mut state) = self.inner.state.lock() {
            state.csrf = Some(CachedCsrf {
                value: value.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(value)
    }

    /// Build, send, and unwrap one API call: bearer token and CSRF header
    /// merged in, 401 handled by idempotent session teardown. Calls are
    /// independent and unordered; nothing is retried.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mutating = method != Method::GET;

        let mut req = self.inner.http.request(method, url);
        if let Ok(state) = self.inner.state.lock() {
            if let Some(token) = &state.token {
                req = req.bearer_auth(token);
            }
            if mutating {
                if let Some(csrf) = &state.csrf {
                    req = req.header(CSRF_HEADER, csrf.value.as_str());
                }
            }
        }
        if let Some(body) = &body {
            req = req.json(body);
        }

        let res = req
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = res.status();

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ClientError::SessionExpired);
        }

        let body: Value = res
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        if status.is_success() && body["success"] == Value::Bool(true) {
            return Ok(body);
        }

        let message = body["error"].as_str().unwrap_or("unknown error").to_string();
        if status == StatusCode::FORBIDDEN {
            // Drop the CSRF cache so the next bootstrap fetches a fresh
            // token; the failed call itself is never retried.
            if let Ok(mut state) = self.inner.state.lock() {
                state.csrf = None;
            }
            return Err(ClientError::Forbidden(message));
        }

        Err(ClientError::Api(status.as_u16(), message))
    }

    /// Teardown on a 401: clear local state and raise the expiry signal.
    /// Safe to run more than once; concurrent rejected calls each pass
    /// through here without observing each other.
    fn expire_session(&self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.token = None;
            state.principal = None;
        }
        self.inner.expired_tx.send_modify(|n| *n += 1);
        tracing::debug!("session expired signal raised");
    }
}

fn parse_field<T: serde::de::DeserializeOwned>(
    body: &Value,
    field: &str,
) -> Result<T, ClientError> {
    serde_json::from_value(body[field].clone())
        .map_err(|e| ClientError::Parse(format!("{field}: {e}")))
}
