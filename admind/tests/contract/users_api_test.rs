//! ユーザー管理API契約テスト
//!
//! /user/list, /user/count, /user/create, /user/update,
//! /user/activate, /user/deactivate, /user/get

use axum::http::StatusCode;
use serde_json::json;

use admind::common::auth::UserRole;

use crate::support::app::{
    call, call_with_token, create_test_app_with_admin, login, login_admin, seed_user,
};

#[tokio::test]
async fn user_list_is_admin_gated() {
    let (app, state) = create_test_app_with_admin().await;
    seed_user(&state, "bob", "bob@example.com", "password123", UserRole::User).await;

    let (status, body) = call(&app, "/user/list", json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not signed in");

    let user_token = login(&app, "bob@example.com", "password123").await;
    let (status, body) = call_with_token(&app, "/user/list", &user_token, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User not authorized");

    let admin_token = login_admin(&app).await;
    let (status, body) = call_with_token(&app, "/user/list", &admin_token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn user_list_supports_search_filter_sort_and_paging() {
    let (app, state) = create_test_app_with_admin().await;
    seed_user(&state, "Alice", "alice@example.com", "password123", UserRole::User).await;
    seed_user(&state, "Bob", "bob@example.com", "password123", UserRole::User).await;
    let token = login_admin(&app).await;

    // 検索
    let (status, body) =
        call_with_token(&app, "/user/list", &token, json!({"search": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["email"], "alice@example.com");

    // ロールフィルター + ソート
    let (status, body) = call_with_token(
        &app,
        "/user/list",
        &token,
        json!({
            "columnFilters": [{"id": "role", "value": "user"}],
            "sorting": [{"id": "email", "desc": true}],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["bob@example.com", "alice@example.com"]);

    // ページング
    let (status, body) = call_with_token(
        &app,
        "/user/list",
        &token,
        json!({"page": 2, "pageSize": 2, "sorting": [{"id": "email", "desc": false}]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // 件数はページングの影響を受けない
    let (status, body) =
        call_with_token(&app, "/user/count", &token, json!({"page": 2, "pageSize": 2})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn status_filter_splits_active_and_banned() {
    let (app, state) = create_test_app_with_admin().await;
    let banned = seed_user(&state, "banned", "banned@example.com", "password123", UserRole::User).await;
    admind::db::users::set_banned(&state.db_pool, banned.id, true)
        .await
        .unwrap();
    let token = login_admin(&app).await;

    let (_, active) = call_with_token(
        &app,
        "/user/list",
        &token,
        json!({"columnFilters": [{"id": "status", "value": "Active"}]}),
    )
    .await;
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["email"], "admin@example.com");

    let (_, inactive) = call_with_token(
        &app,
        "/user/list",
        &token,
        json!({"columnFilters": [{"id": "status", "value": "Banned"}]}),
    )
    .await;
    assert_eq!(inactive.as_array().unwrap().len(), 1);
    assert_eq!(inactive[0]["email"], "banned@example.com");
}

#[tokio::test]
async fn create_user_validates_password_confirmation() {
    let (app, _state) = create_test_app_with_admin().await;
    let token = login_admin(&app).await;

    let (status, body) = call_with_token(
        &app,
        "/user/create",
        &token,
        json!({
            "name": "Carol",
            "email": "carol@example.com",
            "role": "user",
            "password": "secret1",
            "passwordConfirmation": "secret2",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["passwordConfirmation"]["_errors"][0],
        "Password confirmation must be same as password"
    );
}

#[tokio::test]
async fn create_user_rejects_invalid_role() {
    let (app, _state) = create_test_app_with_admin().await;
    let token = login_admin(&app).await;

    let (status, body) = call_with_token(
        &app,
        "/user/create",
        &token,
        json!({
            "name": "Carol",
            "email": "carol@example.com",
            "role": "superuser",
            "password": "secret1",
            "passwordConfirmation": "secret1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["role"]["_errors"][0],
        "Invalid enum value. Expected 'admin' | 'user'"
    );
}

#[tokio::test]
async fn create_user_succeeds_then_conflicts_on_duplicate_email() {
    let (app, _state) = create_test_app_with_admin().await;
    let token = login_admin(&app).await;

    let params = json!({
        "name": "Carol",
        "email": "carol@example.com",
        "role": "user",
        "password": "secret1",
        "passwordConfirmation": "secret1",
    });

    let (status, body) = call_with_token(&app, "/user/create", &token, params.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User created successfully");

    let (status, body) = call_with_token(&app, "/user/create", &token, params).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email 'carol@example.com' is already in use");
}

#[tokio::test]
async fn update_user_changes_fields_and_optionally_password() {
    let (app, state) = create_test_app_with_admin().await;
    let user = seed_user(&state, "Dave", "dave@example.com", "password123", UserRole::User).await;
    let token = login_admin(&app).await;

    let (status, body) = call_with_token(
        &app,
        "/user/update",
        &token,
        json!({
            "id": user.id,
            "name": "David",
            "email": "david@example.com",
            "role": "admin",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");

    // パスワードを変えていないので元のままログインできる
    login(&app, "david@example.com", "password123").await;

    let (status, _) = call_with_token(
        &app,
        "/user/update",
        &token,
        json!({
            "id": user.id,
            "name": "David",
            "email": "david@example.com",
            "role": "admin",
            "password": "newpassword",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    login(&app, "david@example.com", "newpassword").await;
}

#[tokio::test]
async fn update_unknown_user_returns_404() {
    let (app, _state) = create_test_app_with_admin().await;
    let token = login_admin(&app).await;

    let (status, _) = call_with_token(
        &app,
        "/user/update",
        &token,
        json!({
            "id": uuid::Uuid::new_v4(),
            "name": "Ghost",
            "email": "ghost@example.com",
            "role": "user",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deactivate_rejects_self_and_bans_others() {
    let (app, state) = create_test_app_with_admin().await;
    let target = seed_user(&state, "Eve", "eve@example.com", "password123", UserRole::User).await;
    let token = login_admin(&app).await;

    let admin = admind::db::users::find_by_email(&state.db_pool, "admin@example.com")
        .await
        .unwrap()
        .unwrap();
    let (status, body) =
        call_with_token(&app, "/user/deactivate", &token, json!({"id": admin.id})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Cannot deactivate your own account");

    let (status, _) =
        call_with_token(&app, "/user/deactivate", &token, json!({"id": target.id})).await;
    assert_eq!(status, StatusCode::OK);

    // 停止中ユーザーは取得APIから見えない
    let (status, _) =
        call_with_token(&app, "/user/get", &token, json!({"id": target.id})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        call_with_token(&app, "/user/activate", &token, json!({"id": target.id})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) =
        call_with_token(&app, "/user/get", &token, json!({"id": target.id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "eve@example.com");
}
