mod common;

use anyhow::Result;
use serde_json::json;

// Authentication surface: credential exchange and the bearer requirement on
// every /api route. Client-facing failures keep HTTP 200 and signal through
// the envelope's errors field.

#[tokio::test]
async fn login_returns_a_usable_token() -> Result<()> {
    let harness = common::test_app();
    let user_id = common::seed_user(
        &harness.store,
        "Alice Johnson",
        "alice@example.com",
        "alice",
        "user",
        "2024-01-01T00:00:00Z",
    );

    let (status, payload) = common::request(
        &harness.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": common::PASSWORD })),
    )
    .await;

    assert_eq!(status, 200);
    assert!(payload["errors"].is_null(), "unexpected errors: {}", payload);
    let token = payload["data"]["token"].as_str().expect("token in response").to_string();
    assert_eq!(payload["data"]["user"]["id"], json!(user_id));
    assert_eq!(payload["data"]["user"]["handle"], json!("alice"));

    // the returned token opens the protected API
    let (status, payload) = common::get(&harness.app, "/api/users", &token).await;
    assert_eq!(status, 200);
    assert!(payload["errors"].is_null(), "unexpected errors: {}", payload);

    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let harness = common::test_app();
    common::seed_user(
        &harness.store,
        "Alice Johnson",
        "alice@example.com",
        "alice",
        "user",
        "2024-01-01T00:00:00Z",
    );

    let (status, payload) = common::request(
        &harness.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong" })),
    )
    .await;

    assert_eq!(status, 200);
    assert!(payload["data"].is_null());
    assert_eq!(common::errors(&payload), vec!["Invalid email or password."]);

    // unknown email gets the same message
    let (_, payload) = common::request(
        &harness.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": common::PASSWORD })),
    )
    .await;
    assert_eq!(common::errors(&payload), vec!["Invalid email or password."]);

    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let harness = common::test_app();

    let (status, payload) = common::request(&harness.app, "GET", "/api/users", None, None).await;
    assert_eq!(status, 200);
    assert!(payload["data"].is_null());
    assert_eq!(common::errors(&payload), vec!["Missing Authorization header"]);

    let (_, payload) = common::get(&harness.app, "/api/users", "garbage-token").await;
    assert!(payload["data"].is_null());
    let errors = common::errors(&payload);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Invalid token"), "{}", errors[0]);

    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let harness = common::test_app();

    let (status, payload) = common::request(
        &harness.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "", "password": "" })),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(common::errors(&payload), vec!["Email and password are required."]);

    Ok(())
}
