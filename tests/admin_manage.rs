mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use mindcare_api::database::models::{AdminRole, UserRole};
use mindcare_api::database::store::CredentialStore;

use common::{admin_token, seed_account, seed_admin, send, test_app};

#[tokio::test]
async fn super_admin_registers_a_new_admin_who_can_log_in() {
    let (app, state, _) = test_app();
    let root = seed_admin(&state, "root@x.com", "root", "password1", AdminRole::SuperAdmin).await;
    let token = admin_token(&state, &root);

    let (status, value) = send(
        &app,
        Method::POST,
        "/admin/auth/register",
        Some(&token),
        Some(json!({
            "email": "new@x.com",
            "username": "newbie",
            "password": "password2"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    // Register defaults the role to moderator, not the model default
    assert_eq!(value["data"]["admin"]["role"], "moderator");
    assert!(value["data"]["admin"].get("password").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/auth/login",
        None,
        Some(json!({ "email": "new@x.com", "password": "password2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn moderator_cannot_register_admins() {
    let (app, state, _) = test_app();
    let moderator = seed_admin(&state, "m@x.com", "m", "password1", AdminRole::Moderator).await;
    let token = admin_token(&state, &moderator);

    let (status, value) = send(
        &app,
        Method::POST,
        "/admin/auth/register",
        Some(&token),
        Some(json!({ "email": "x@x.com", "username": "x", "password": "password2" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(value["message"].as_str().unwrap().contains("super-admin"));
}

#[tokio::test]
async fn duplicate_email_register_fails_and_leaves_the_store_unchanged() {
    let (app, state, store) = test_app();
    let root = seed_admin(&state, "root@x.com", "root", "password1", AdminRole::SuperAdmin).await;
    seed_admin(&state, "taken@x.com", "taken", "password1", AdminRole::Moderator).await;
    let token = admin_token(&state, &root);

    let (status, value) = send(
        &app,
        Method::POST,
        "/admin/auth/register",
        Some(&token),
        Some(json!({ "email": "taken@x.com", "username": "fresh", "password": "password2" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["message"].as_str().unwrap().contains("email"));
    assert_eq!(store.list_admins().await.unwrap().len(), 2);
}

#[tokio::test]
async fn register_rejects_unknown_roles_and_short_passwords() {
    let (app, state, _) = test_app();
    let root = seed_admin(&state, "root@x.com", "root", "password1", AdminRole::SuperAdmin).await;
    let token = admin_token(&state, &root);

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/auth/register",
        Some(&token),
        Some(json!({ "email": "a@x.com", "username": "a", "password": "password2", "role": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/auth/register",
        Some(&token),
        Some(json!({ "email": "a@x.com", "username": "a", "password": "tiny" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_is_super_admin_only_and_reports_the_total() {
    let (app, state, _) = test_app();
    let root = seed_admin(&state, "root@x.com", "root", "password1", AdminRole::SuperAdmin).await;
    seed_admin(&state, "m@x.com", "m", "password1", AdminRole::Moderator).await;

    let (status, value) = send(
        &app,
        Method::GET,
        "/admin/auth/list",
        Some(&admin_token(&state, &root)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["total"], 2);
    for admin in value["data"]["admins"].as_array().unwrap() {
        assert!(admin.get("passwordHash").is_none());
    }
}

#[tokio::test]
async fn toggle_status_refuses_self_and_flips_others() {
    let (app, state, store) = test_app();
    let root = seed_admin(&state, "root@x.com", "root", "password1", AdminRole::SuperAdmin).await;
    let other = seed_admin(&state, "o@x.com", "o", "password1", AdminRole::Moderator).await;
    let token = admin_token(&state, &root);

    // Self-toggle is always refused; the flag never flips
    let (status, value) = send(
        &app,
        Method::PUT,
        &format!("/admin/auth/{}/toggle-status", root.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["message"].as_str().unwrap().contains("own account"));
    assert!(store.find_admin_by_id(root.id).await.unwrap().unwrap().is_active);

    let (status, value) = send(
        &app,
        Method::PUT,
        &format!("/admin/auth/{}/toggle-status", other.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["admin"]["isActive"], false);
    assert!(!store.find_admin_by_id(other.id).await.unwrap().unwrap().is_active);

    // Toggling again re-activates
    let (status, value) = send(
        &app,
        Method::PUT,
        &format!("/admin/auth/{}/toggle-status", other.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["admin"]["isActive"], true);
}

#[tokio::test]
async fn toggle_status_of_unknown_admin_is_not_found() {
    let (app, state, _) = test_app();
    let root = seed_admin(&state, "root@x.com", "root", "password1", AdminRole::SuperAdmin).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/admin/auth/{}/toggle-status", Uuid::new_v4()),
        Some(&admin_token(&state, &root)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let (app, state, _) = test_app();
    let admin = seed_admin(&state, "a@x.com", "a", "old-password", AdminRole::Moderator).await;
    let token = admin_token(&state, &admin);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/admin/auth/change-password",
        Some(&token),
        Some(json!({ "currentPassword": "not-it", "newPassword": "new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/admin/auth/change-password",
        Some(&token),
        Some(json!({ "currentPassword": "old-password", "newPassword": "tiny" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/admin/auth/change-password",
        Some(&token),
        Some(json!({ "currentPassword": "old-password", "newPassword": "new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password is dead, new one works
    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "old-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_changes_only_the_provided_fields() {
    let (app, state, _) = test_app();
    let admin = seed_admin(&state, "a@x.com", "a", "password1", AdminRole::Moderator).await;
    let token = admin_token(&state, &admin);

    let (status, value) = send(
        &app,
        Method::PUT,
        "/admin/auth/profile",
        Some(&token),
        Some(json!({ "firstName": "Renamed", "phone": "555-0100" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["firstName"], "Renamed");
    assert_eq!(value["data"]["lastName"], "Admin");
    assert_eq!(value["data"]["phone"], "555-0100");
}

#[tokio::test]
async fn admin_can_manage_ordinary_accounts() {
    let (app, state, store) = test_app();
    let root = seed_admin(&state, "root@x.com", "root", "password1", AdminRole::SuperAdmin).await;
    let token = admin_token(&state, &root);

    let patient = seed_account(&state, "p@x.com", "pat", "password1", UserRole::Patient).await;
    seed_account(&state, "d@x.com", "doc", "password1", UserRole::Doctor).await;
    let legacy = seed_account(&state, "old@x.com", "old", "password1", UserRole::Admin).await;

    // Filtered list
    let (status, value) = send(
        &app,
        Method::GET,
        "/admin/users?role=doctor",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["total"], 1);
    assert_eq!(value["data"]["users"][0]["username"], "doc");

    // Search
    let (status, value) = send(
        &app,
        Method::GET,
        "/admin/users?search=pat",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["total"], 1);

    // Create with explicit role
    let (status, value) = send(
        &app,
        Method::POST,
        "/admin/users/add",
        Some(&token),
        Some(json!({
            "email": "h@x.com",
            "username": "hosp",
            "password": "password2",
            "role": "hospital"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(value["data"]["user"]["role"], "hospital");

    // Toggle an account off and on
    let (status, value) = send(
        &app,
        Method::PUT,
        &format!("/admin/users/{}/toggle-status", patient.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["user"]["isActive"], false);

    // Delete a patient
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/admin/users/{}", patient.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.find_account_by_id(patient.id).await.unwrap().is_none());

    // Admin-role accounts cannot be deleted through this path
    let (status, value) = send(
        &app,
        Method::DELETE,
        &format!("/admin/users/{}", legacy.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(value["message"].as_str().unwrap().contains("admin"));
    assert!(store.find_account_by_id(legacy.id).await.unwrap().is_some());
}
