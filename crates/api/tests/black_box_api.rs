use reqwest::StatusCode;
use serde_json::{Value, json};

use fintrack_api::config::Config;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(secret: &str) -> Self {
        // Build the app (same router as prod) but bind to an ephemeral port.
        // cookie_secure is off because the test transport is plain HTTP.
        let config = Config {
            session_secret: secret.as_bytes().to_vec(),
            bind_addr: "127.0.0.1:0".to_string(),
            cookie_secure: false,
        };
        let app = fintrack_api::app::build_app(&config).expect("failed to build app");

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
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

const SECRET: &str = "integration-secret-0123456789abcdef";

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("failed to build client")
}

async fn bootstrap_csrf(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .get(format!("{base_url}/auth/csrf"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    body["csrf_token"].as_str().unwrap().to_string()
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    csrf: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/auth/register"))
        .header("x-csrf-token", csrf)
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

async fn login(
    client: &reqwest::Client,
    base_url: &str,
    csrf: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/auth/login"))
        .header("x-csrf-token", csrf)
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

/// Register + login a fresh account, returning (csrf, bearer token).
async fn signed_in_session(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
) -> (String, String) {
    let csrf = bootstrap_csrf(client, base_url).await;

    let res = register(client, base_url, &csrf, email, "Aa1!aaaa").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = login(client, base_url, &csrf, email, "Aa1!aaaa").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    (csrf, token)
}

fn expense_body() -> Value {
    json!({
        "description": "weekly groceries",
        "amount_cents": 5400,
        "category": "food",
        "incurred_on": "2026-03-14",
    })
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn(SECRET).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_me_round_trip() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let csrf = bootstrap_csrf(&client, &srv.base_url).await;

    let res = register(&client, &srv.base_url, &csrf, "a@x.com", "Aa1!aaaa").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let registered: Value = res.json().await.unwrap();
    let id = registered["principal"]["id"].as_str().unwrap().to_string();

    let res = login(&client, &srv.base_url, &csrf, "a@x.com", "Aa1!aaaa").await;
    assert_eq!(res.status(), StatusCode::OK);
    let logged_in: Value = res.json().await.unwrap();
    let token = logged_in["token"].as_str().unwrap();
    assert_eq!(logged_in["principal"]["id"].as_str().unwrap(), id);

    let res = client
        .get(format!("{}/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["principal"]["id"].as_str().unwrap(), id);
    assert_eq!(me["principal"]["email"].as_str().unwrap(), "a@x.com");
}

#[tokio::test]
async fn failed_logins_are_indistinguishable() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let csrf = bootstrap_csrf(&client, &srv.base_url).await;

    let res = register(&client, &srv.base_url, &csrf, "a@x.com", "Aa1!aaaa").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let wrong_password = login(&client, &srv.base_url, &csrf, "a@x.com", "wrong").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let unknown_email = login(&client, &srv.base_url, &csrf, "nobody@x.com", "Aa1!aaaa").await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: Value = unknown_email.json().await.unwrap();

    // Identical bodies: no signal about which part of the pair was wrong.
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["success"], json!(false));
}

#[tokio::test]
async fn duplicate_registration_is_a_generic_conflict() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let csrf = bootstrap_csrf(&client, &srv.base_url).await;

    let res = register(&client, &srv.base_url, &csrf, "a@x.com", "Aa1!aaaa").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = register(&client, &srv.base_url, &csrf, "a@x.com", "Bb2@bbbb").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "unable to register account");
}

#[tokio::test]
async fn registration_validation_reports_field_issues() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let csrf = bootstrap_csrf(&client, &srv.base_url).await;

    let res = register(&client, &srv.base_url, &csrf, "not-an-email", "weak").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    let issues = body["issues"].as_array().unwrap();
    assert!(issues.iter().any(|i| i["path"] == "email"));
    assert!(issues.iter().any(|i| i["path"] == "password"));
}

#[tokio::test]
async fn me_requires_a_token() {
    let srv = TestServer::spawn(SECRET).await;

    let res = reqwest::get(format!("{}/me", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let (_csrf, token) = signed_in_session(&client, &srv.base_url, "a@x.com").await;

    let (payload, signature) = token.split_once('.').unwrap();
    let mut chars: Vec<char> = payload.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    let tampered_payload: String = chars.into_iter().collect();
    let tampered = format!("{tampered_payload}.{signature}");

    let res = client
        .get(format!("{}/me", srv.base_url))
        .bearer_auth(tampered)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_cookie_gates_like_the_bearer_header() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let (csrf, _token) = signed_in_session(&client, &srv.base_url, "a@x.com").await;

    // No Authorization header: the login-set httpOnly cookie carries the
    // session through the same verify path.
    let res = client
        .get(format!("{}/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Logout clears the cookie; the cookie transport stops working.
    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .header("x-csrf-token", csrf.as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutating_call_without_csrf_header_is_forbidden() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let (_csrf, token) = signed_in_session(&client, &srv.base_url, "a@x.com").await;

    // Valid, unexpired bearer token; the cookie is present in the jar but
    // the header is missing. Authentication validity does not matter.
    let res = client
        .post(format!("{}/expenses", srv.base_url))
        .bearer_auth(&token)
        .json(&expense_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // No side effect reached the store.
    let res = client
        .get(format!("{}/expenses", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["expenses"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn csrf_guard_runs_before_authentication() {
    let srv = TestServer::spawn(SECRET).await;

    // Neither CSRF pair nor token: the CSRF stage rejects first.
    let res = reqwest::Client::new()
        .post(format!("{}/expenses", srv.base_url))
        .json(&expense_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rotated_csrf_cookie_invalidates_the_old_header() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let (stale_csrf, token) = signed_in_session(&client, &srv.base_url, "a@x.com").await;

    // Re-bootstrap rotates the cookie in the jar.
    let fresh_csrf = bootstrap_csrf(&client, &srv.base_url).await;
    assert_ne!(stale_csrf, fresh_csrf);

    let res = client
        .post(format!("{}/expenses", srv.base_url))
        .bearer_auth(&token)
        .header("x-csrf-token", stale_csrf.as_str())
        .json(&expense_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/expenses", srv.base_url))
        .bearer_auth(&token)
        .header("x-csrf-token", fresh_csrf.as_str())
        .json(&expense_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn expense_crud_lifecycle() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let (csrf, token) = signed_in_session(&client, &srv.base_url, "a@x.com").await;

    // Create
    let res = client
        .post(format!("{}/expenses", srv.base_url))
        .bearer_auth(&token)
        .header("x-csrf-token", csrf.as_str())
        .json(&expense_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["expense"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["expense"]["amount_cents"], json!(5400));

    // Read
    let res = client
        .get(format!("{}/expenses/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Update
    let res = client
        .put(format!("{}/expenses/{}", srv.base_url, id))
        .bearer_auth(&token)
        .header("x-csrf-token", csrf.as_str())
        .json(&json!({ "amount_cents": 9900 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["expense"]["amount_cents"], json!(9900));
    assert_eq!(
        updated["expense"]["description"].as_str().unwrap(),
        "weekly groceries"
    );

    // List
    let res = client
        .get(format!("{}/expenses", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["expenses"].as_array().unwrap().len(), 1);

    // Delete, then the id is gone.
    let res = client
        .delete(format!("{}/expenses/{}", srv.base_url, id))
        .bearer_auth(&token)
        .header("x-csrf-token", csrf.as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/expenses/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_expense_input_reports_issues() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let (csrf, token) = signed_in_session(&client, &srv.base_url, "a@x.com").await;

    let res = client
        .post(format!("{}/expenses", srv.base_url))
        .bearer_auth(&token)
        .header("x-csrf-token", csrf.as_str())
        .json(&json!({
            "description": "   ",
            "amount_cents": 0,
            "category": "food",
            "incurred_on": "2026-03-14",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    let issues = body["issues"].as_array().unwrap();
    assert!(issues.iter().any(|i| i["path"] == "description"));
    assert!(issues.iter().any(|i| i["path"] == "amount_cents"));
}

#[tokio::test]
async fn cross_owner_access_is_indistinguishable_from_absence() {
    let srv = TestServer::spawn(SECRET).await;

    let alice = client();
    let (alice_csrf, alice_token) = signed_in_session(&alice, &srv.base_url, "alice@x.com").await;

    let bob = client();
    let (bob_csrf, bob_token) = signed_in_session(&bob, &srv.base_url, "bob@x.com").await;

    // Alice creates an expense.
    let res = alice
        .post(format!("{}/expenses", srv.base_url))
        .bearer_auth(&alice_token)
        .header("x-csrf-token", alice_csrf.as_str())
        .json(&expense_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let alices_id = created["expense"]["id"].as_str().unwrap().to_string();

    // Bob deleting Alice's expense and Bob deleting a never-existing id
    // produce byte-identical responses.
    let res = bob
        .delete(format!("{}/expenses/{}", srv.base_url, alices_id))
        .bearer_auth(&bob_token)
        .header("x-csrf-token", bob_csrf.as_str())
        .send()
        .await
        .unwrap();
    let cross_owner_status = res.status();
    let cross_owner_body: Value = res.json().await.unwrap();

    let ghost_id = uuid::Uuid::now_v7();
    let res = bob
        .delete(format!("{}/expenses/{}", srv.base_url, ghost_id))
        .bearer_auth(&bob_token)
        .header("x-csrf-token", bob_csrf.as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(cross_owner_status, StatusCode::NOT_FOUND);
    let ghost_body: Value = res.json().await.unwrap();
    assert_eq!(cross_owner_body, ghost_body);

    // Same for reads and updates, and Alice's row survived the attempt.
    let res = bob
        .get(format!("{}/expenses/{}", srv.base_url, alices_id))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = bob
        .put(format!("{}/expenses/{}", srv.base_url, alices_id))
        .bearer_auth(&bob_token)
        .header("x-csrf-token", bob_csrf.as_str())
        .json(&json!({ "amount_cents": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = alice
        .get(format!("{}/expenses/{}", srv.base_url, alices_id))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["expense"]["amount_cents"], json!(5400));
}

#[tokio::test]
async fn budget_upsert_converges_per_owner() {
    let srv = TestServer::spawn(SECRET).await;
    let client = client();
    let (csrf, token) = signed_in_session(&client, &srv.base_url, "a@x.com").await;

    // Unset budget reads as absent.
    let res = client
        .get(format!("{}/budget", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Repeated puts converge to the latest value.
    for limit in [100_000, 250_000] {
        let res = client
            .put(format!("{}/budget", srv.base_url))
            .bearer_auth(&token)
            .header("x-csrf-token", csrf.as_str())
            .json(&json!({ "month_limit_cents": limit }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!("{}/budget", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["budget"]["month_limit_cents"], json!(250_000));

    let res = client
        .delete(format!("{}/budget", srv.base_url))
        .bearer_auth(&token)
        .header("x-csrf-token", csrf.as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/budget", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
