mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use mindcare_api::database::models::UserRole;
use mindcare_api::database::store::CredentialStore;

use common::{seed_account, send, test_app};

#[tokio::test]
async fn register_then_use_the_returned_token() {
    let (app, _, _) = test_app();

    let (status, value) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": "New@Example.com",
            "username": "newuser",
            "password": "password1",
            "firstName": "New"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(value["data"]["user"]["role"], "patient");
    assert_eq!(value["data"]["user"]["type"], "user");
    // Emails are normalized to lowercase on the way in
    assert_eq!(value["data"]["user"]["email"], "new@example.com");

    let token = value["data"]["token"].as_str().unwrap().to_string();
    let (status, value) = send(&app, Method::GET, "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["username"], "newuser");
}

#[tokio::test]
async fn register_rejects_duplicates_and_short_passwords() {
    let (app, state, _) = test_app();
    seed_account(&state, "taken@x.com", "taken", "password1", UserRole::Patient).await;

    let (status, value) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "taken@x.com", "username": "fresh", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["message"].as_str().unwrap().contains("Email"));

    let (status, value) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "fresh@x.com", "username": "taken", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["message"].as_str().unwrap().contains("Username"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "fresh@x.com", "username": "fresh", "password": "tiny" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_uniform_and_inactive_accounts_are_refused() {
    let (app, state, store) = test_app();
    let account = seed_account(&state, "p@x.com", "pat", "password1", UserRole::Patient).await;

    let (status_a, body_a) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "p@x.com", "password": "wrong" })),
    )
    .await;
    let (status_b, body_b) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ghost@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status_a, StatusCode::BAD_REQUEST);
    assert_eq!(status_a, status_b);
    assert_eq!(body_a, body_b);

    store.set_account_active(account.id, false).await.unwrap();
    let (status, value) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "p@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(value["code"], "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn ordinary_accounts_never_lock_out() {
    // The lockout machine exists only on the admin store; repeated failures
    // here must not brick the account
    let (app, state, _) = test_app();
    seed_account(&state, "p@x.com", "pat", "password1", UserRole::Patient).await;

    for _ in 0..6 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "p@x.com", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "p@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_is_partial() {
    let (app, state, _) = test_app();
    let account = seed_account(&state, "p@x.com", "pat", "password1", UserRole::Patient).await;
    let token = common::user_token(&state, &account);

    let (status, value) = send(
        &app,
        Method::PUT,
        "/auth/profile",
        Some(&token),
        Some(json!({ "firstName": "Pat" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["firstName"], "Pat");
    assert_eq!(value["data"]["lastName"], serde_json::Value::Null);
}
