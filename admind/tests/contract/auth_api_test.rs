//! 認証API契約テスト
//!
//! /user/login, /user/logout, /user/current

use axum::http::StatusCode;
use serde_json::json;

use admind::common::auth::UserRole;

use crate::support::app::{call, call_empty, create_test_app_with_admin, login_admin, seed_user};

#[tokio::test]
async fn login_returns_token_and_user() {
    let (app, _state) = create_test_app_with_admin().await;

    let (status, body) = call(
        &app,
        "/user/login",
        json!({"email": "admin@example.com", "password": "password123"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn login_failure_is_identical_for_bad_password_and_unknown_email() {
    let (app, _state) = create_test_app_with_admin().await;

    let (status, wrong) = call(
        &app,
        "/user/login",
        json!({"email": "admin@example.com", "password": "wrong-pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = call(
        &app,
        "/user/login",
        json!({"email": "ghost@example.com", "password": "password123"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(wrong["error"], unknown["error"]);
    assert_eq!(wrong["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_rejects_banned_account() {
    let (app, state) = create_test_app_with_admin().await;
    let banned = seed_user(&state, "banned", "banned@example.com", "password123", UserRole::User).await;
    admind::db::users::set_banned(&state.db_pool, banned.id, true)
        .await
        .unwrap();

    let (status, body) = call(
        &app,
        "/user/login",
        json!({"email": "banned@example.com", "password": "password123"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Account is banned");
}

#[tokio::test]
async fn login_validates_input_shape() {
    let (app, _state) = create_test_app_with_admin().await;

    let (status, body) = call(
        &app,
        "/user/login",
        json!({"email": "not-an-email", "password": "short"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["email"]["_errors"][0], "Invalid email");
    assert_eq!(
        body["details"]["password"]["_errors"][0],
        "String must contain at least 6 character(s)"
    );
}

#[tokio::test]
async fn current_user_requires_session() {
    let (app, _state) = create_test_app_with_admin().await;

    let (status, body) = call_empty(&app, "/user/current", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not signed in");

    let token = login_admin(&app).await;
    let (status, body) = call_empty(&app, "/user/current", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "admin@example.com");
}

#[tokio::test]
async fn invalid_token_is_treated_as_anonymous() {
    let (app, _state) = create_test_app_with_admin().await;

    let (status, body) = call_empty(&app, "/user/current", Some("garbage-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not signed in");
}

#[tokio::test]
async fn logout_round_trip() {
    let (app, _state) = create_test_app_with_admin().await;
    let token = login_admin(&app).await;

    let (status, body) = call_empty(&app, "/user/logout", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Signed out successfully");

    let (status, _body) = call_empty(&app, "/user/logout", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
