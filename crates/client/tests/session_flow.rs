use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

use fintrack_api::config::Config;
use fintrack_client::{ClientError, ExpenseChanges, NewExpense, SessionClient};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn spawn_api() -> Self {
        let config = Config {
            session_secret: b"integration-secret-0123456789abcdef".to_vec(),
            bind_addr: "127.0.0.1:0".to_string(),
            cookie_secure: false,
        };
        let app = fintrack_api::app::build_app(&config).expect("failed to build app");
        Self::spawn(app).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Against the real API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_session_flow_against_real_api() {
    let srv = TestServer::spawn_api().await;
    let client = SessionClient::new(srv.base_url.clone()).unwrap();

    // Bootstrap with no stored token just fetches a CSRF token.
    client.bootstrap().await.unwrap();

    let registered = client.register("a@x.com", "Aa1!aaaa").await.unwrap();
    assert_eq!(registered.email, "a@x.com");

    let principal = client.login("a@x.com", "Aa1!aaaa").await.unwrap();
    assert_eq!(principal.id, registered.id);
    assert!(client.token().is_some());
    assert_eq!(client.principal().unwrap().id, principal.id);

    // Owned-resource round trip through the typed helpers.
    let created = client
        .create_expense(&NewExpense {
            description: "weekly groceries".to_string(),
            amount_cents: 5400,
            category: "food".to_string(),
            incurred_on: "2026-03-14".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.amount_cents, 5400);

    let listed = client.list_expenses().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    let updated = client
        .update_expense(
            &created.id,
            &ExpenseChanges {
                amount_cents: Some(9900),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_cents, 9900);
    assert_eq!(updated.description, "weekly groceries");

    assert!(client.budget().await.unwrap().is_none());
    let budget = client.set_budget(250_000).await.unwrap();
    assert_eq!(budget.month_limit_cents, 250_000);
    assert_eq!(
        client.budget().await.unwrap().unwrap().month_limit_cents,
        250_000
    );

    client.delete_expense(&created.id).await.unwrap();
    assert!(client.list_expenses().await.unwrap().is_empty());

    // Logout is purely local.
    client.logout();
    assert!(client.token().is_none());
    assert!(client.principal().is_none());
}

#[tokio::test]
async fn validation_failures_surface_as_api_errors() {
    let srv = TestServer::spawn_api().await;
    let client = SessionClient::new(srv.base_url.clone()).unwrap();

    let err = client.register("not-an-email", "weak").await.unwrap_err();
    match err {
        ClientError::Api(status, message) => {
            assert_eq!(status, 400);
            assert_eq!(message, "validation failed");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_login_teardown_is_harmless_without_a_session() {
    let srv = TestServer::spawn_api().await;
    let client = SessionClient::new(srv.base_url.clone()).unwrap();
    let mut expiry = client.subscribe_expiry();

    let err = client.login("nobody@x.com", "Aa1!aaaa").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));

    // There was no session to lose; the signal still fired for the 401 and
    // state stays empty — the teardown must be harmless.
    assert!(client.token().is_none());
    assert_eq!(*expiry.borrow_and_update(), 1);
}

// ---------------------------------------------------------------------------
// Against a stub that always rejects authenticated calls
// ---------------------------------------------------------------------------

fn stub_router() -> Router {
    async fn csrf_stub() -> impl IntoResponse {
        (
            [(
                header::SET_COOKIE,
                HeaderValue::from_static("csrfToken=stub; Path=/"),
            )],
            Json(json!({ "success": true, "csrf_token": "stub" })),
        )
    }

    async fn login_stub() -> Json<Value> {
        Json(json!({
            "success": true,
            "token": "stub-token",
            "principal": {
                "id": "00000000-0000-0000-0000-000000000000",
                "email": "a@x.com",
            },
        }))
    }

    async fn unauthorized_stub() -> impl IntoResponse {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "authentication required" })),
        )
    }

    Router::new()
        .route("/auth/csrf", get(csrf_stub))
        .route("/auth/login", post(login_stub))
        .route("/me", get(unauthorized_stub))
        .route("/expenses", get(unauthorized_stub))
}

#[tokio::test]
async fn concurrent_401s_tear_down_idempotently() {
    let srv = TestServer::spawn(stub_router()).await;
    let client = SessionClient::new(srv.base_url.clone()).unwrap();
    let mut expiry = client.subscribe_expiry();
    assert_eq!(*expiry.borrow_and_update(), 0);

    client.login("a@x.com", "Aa1!aaaa").await.unwrap();
    assert!(client.token().is_some());

    // Two in-flight calls both hit 401: each clears state and raises the
    // signal once; the second teardown over empty state must not fail.
    let (a, b) = tokio::join!(client.list_expenses(), client.list_expenses());
    assert!(matches!(a, Err(ClientError::SessionExpired)));
    assert!(matches!(b, Err(ClientError::SessionExpired)));

    assert!(client.token().is_none());
    assert!(client.principal().is_none());
    assert!(expiry.has_changed().unwrap());
    assert_eq!(*expiry.borrow_and_update(), 2);
}

#[tokio::test]
async fn bootstrap_clears_a_stale_stored_token() {
    let srv = TestServer::spawn(stub_router()).await;
    let client = SessionClient::new(srv.base_url.clone()).unwrap();

    client.login("a@x.com", "Aa1!aaaa").await.unwrap();
    assert!(client.token().is_some());

    // The stub rejects /me, standing in for an expired token: bootstrap
    // swallows the rejection and leaves a clean local state.
    client.bootstrap().await.unwrap();

    assert!(client.token().is_none());
    assert!(client.principal().is_none());
}
