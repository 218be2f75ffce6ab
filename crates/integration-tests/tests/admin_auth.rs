//! Account and session flows against a running admin server.

#![allow(clippy::unwrap_used)]

use kubra_market_integration_tests::{TestContext, test_config};
use serde_json::{Value, json};

#[tokio::test]
async fn test_register_login_current_user_flow() {
    let ctx = TestContext::new().await;

    let user = ctx.register("alice", "secret123").await;
    assert_eq!(user["username"], "alice");
    assert!(user.get("password").is_none());

    // A different browser has no session.
    let anonymous = TestContext::new_client();
    let response = anonymous.get(ctx.url("/api/user")).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let browser = TestContext::new_client();
    let response = browser
        .post(ctx.url("/api/login"))
        .json(&json!({ "username": "alice", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(
        response
            .headers()
            .get_all("set-cookie")
            .iter()
            .any(|c| c.to_str().unwrap().starts_with("km_admin_session="))
    );

    let response = browser.get(ctx.url("/api/user")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let me: Value = response.json().await.unwrap();
    assert_eq!(me["username"], "alice");
    assert!(me.get("password").is_none());
}

#[tokio::test]
async fn test_login_errors_are_uniform() {
    let ctx = TestContext::new().await;
    ctx.register("alice", "secret123").await;

    let browser = TestContext::new_client();
    let missing: Value = browser
        .post(ctx.url("/api/login"))
        .json(&json!({ "username": "nouser", "password": "secret123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let response = browser
        .post(ctx.url("/api/login"))
        .json(&json!({ "username": "alice", "password": "wrongpass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let wrong: Value = response.json().await.unwrap();

    assert_eq!(missing, wrong);
    assert_eq!(wrong["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_duplicate_username_is_bad_request() {
    let ctx = TestContext::new().await;
    ctx.register("alice", "secret123").await;

    let other = TestContext::new_client();
    let response = other
        .post(ctx.url("/api/register"))
        .json(&json!({ "username": "alice", "password": "another" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Username already exists");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let ctx = TestContext::new().await;
    ctx.register("alice", "secret123").await;
    assert_eq!(ctx.get("/api/user").await.status(), 200);

    assert_eq!(ctx.post("/api/logout", &json!({})).await.status(), 200);
    assert_eq!(ctx.get("/api/user").await.status(), 401);

    // Logging out again is harmless.
    assert_eq!(ctx.post("/api/logout", &json!({})).await.status(), 200);
}

#[tokio::test]
async fn test_profile_update_ignores_password() {
    let ctx = TestContext::new().await;
    ctx.register("alice", "secret123").await;

    let response = ctx
        .put(
            "/api/user",
            &json!({ "firstName": "Alice", "email": "alice@example.com", "password": "hijacked" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let me: Value = response.json().await.unwrap();
    assert_eq!(me["firstName"], "Alice");
    assert_eq!(me["email"], "alice@example.com");

    let browser = TestContext::new_client();
    let hijacked = browser
        .post(ctx.url("/api/login"))
        .json(&json!({ "username": "alice", "password": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(hijacked.status(), 401);
    let original = browser
        .post(ctx.url("/api/login"))
        .json(&json!({ "username": "alice", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(original.status(), 200);
}

#[tokio::test]
async fn test_profile_update_requires_session() {
    let ctx = TestContext::new().await;
    let response = ctx.put("/api/user", &json!({ "firstName": "Nobody" })).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_register_with_profile_fields() {
    let ctx = TestContext::new().await;
    let response = ctx
        .post(
            "/api/register",
            &json!({
                "username": "bob",
                "password": "pw",
                "firstName": "Bob",
                "lastName": "Builder",
                "avatar": "https://example.com/bob.png"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["lastName"], "Builder");
    assert!(user["email"].is_null());
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new().await;
    let response = ctx
        .post("/api/register", &json!({ "username": "", "password": "" }))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_registration_disabled() {
    let mut config = test_config();
    config.allow_registration = false;
    let ctx = TestContext::with_config(config).await;

    let response = ctx
        .post("/api/register", &json!({ "username": "x", "password": "y" }))
        .await;
    assert_eq!(response.status(), 403);
}
