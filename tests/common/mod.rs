#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use mindcare_api::auth::lockout::LockoutPolicy;
use mindcare_api::auth::password;
use mindcare_api::auth::token::{TokenCodec, TokenSubject};
use mindcare_api::config::BootstrapConfig;
use mindcare_api::database::models::{Account, AdminAccount, AdminRole, UserRole};
use mindcare_api::database::store::{CredentialStore, NewAccount, NewAdminAccount};
use mindcare_api::database::MemoryCredentialStore;
use mindcare_api::middleware::AUTH_HEADER;
use mindcare_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_state() -> (AppState, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let state = AppState {
        store: store.clone(),
        tokens: TokenCodec::new(TEST_SECRET, Duration::days(7)),
        lockout: LockoutPolicy::default(),
        bcrypt_cost: TEST_BCRYPT_COST,
        bootstrap: BootstrapConfig {
            admin_email: "root@example.com".into(),
            admin_password: "bootstrap-pass".into(),
        },
    };
    (state, store)
}

pub fn test_app() -> (Router, AppState, Arc<MemoryCredentialStore>) {
    let (state, store) = test_state();
    (mindcare_api::app(state.clone()), state, store)
}

pub async fn seed_admin(
    state: &AppState,
    email: &str,
    username: &str,
    plain_password: &str,
    role: AdminRole,
) -> AdminAccount {
    let password_hash = password::hash(plain_password, TEST_BCRYPT_COST).await.unwrap();
    state
        .store
        .insert_admin(NewAdminAccount {
            email: email.into(),
            username: username.into(),
            password_hash,
            first_name: "Seed".into(),
            last_name: "Admin".into(),
            role,
            phone: None,
            assigned_sections: vec!["forum".into()],
        })
        .await
        .unwrap()
}

pub async fn seed_account(
    state: &AppState,
    email: &str,
    username: &str,
    plain_password: &str,
    role: UserRole,
) -> Account {
    let password_hash = password::hash(plain_password, TEST_BCRYPT_COST).await.unwrap();
    state
        .store
        .insert_account(NewAccount {
            email: email.into(),
            username: username.into(),
            password_hash,
            role,
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap()
}

pub fn admin_token(state: &AppState, admin: &AdminAccount) -> String {
    state
        .tokens
        .issue(TokenSubject::Admin {
            id: admin.id,
            role: admin.role,
        })
        .unwrap()
}

pub fn user_token(state: &AppState, account: &Account) -> String {
    state
        .tokens
        .issue(TokenSubject::User {
            id: account.id,
            role: account.role,
        })
        .unwrap()
}

/// Drive one request through the router and parse the JSON body (Null when
/// the response has no body).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTH_HEADER, token);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
