use std::sync::Arc;

use admind::common::auth::UserRole;
use admind::server_api::manifest::api_manifest;
use admind::server_api::registry::ApiRegistry;
use admind::server_api::route::create_app;
use admind::storage::local::LocalStorage;
use admind::AppState;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

/// テスト用のアプリケーションを作成する（.oneshot()スタイルのテスト用）
pub async fn create_test_app() -> (Router, AppState) {
    let db_pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations");

    let storage_dir = std::env::temp_dir().join(format!("admind-test-{}", uuid::Uuid::new_v4()));
    let storage = Arc::new(LocalStorage::new(
        storage_dir,
        "http://localhost/files".to_string(),
    ));

    let registry = ApiRegistry::build(api_manifest()).expect("Invalid endpoint manifest");

    let state = AppState {
        db_pool,
        jwt_secret: "test-secret".to_string(),
        storage,
        registry: Arc::new(registry),
        shutdown: admind::shutdown::ShutdownController::default(),
    };

    (create_app(state.clone()), state)
}

/// 管理者を登録済みのテストアプリケーションを作成する
pub async fn create_test_app_with_admin() -> (Router, AppState) {
    let (app, state) = create_test_app().await;
    seed_user(&state, "admin", "admin@example.com", "password123", UserRole::Admin).await;
    (app, state)
}

/// ユーザーをDBへ直接登録する
pub async fn seed_user(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: UserRole,
) -> admind::common::auth::User {
    let hash = admind::auth::password::hash_password(password).expect("Failed to hash password");
    admind::db::users::create(&state.db_pool, name, email, &hash, role)
        .await
        .expect("Failed to seed user")
}

/// サーバーAPIエンドポイントをPOSTで呼び出す
pub async fn call(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    call_inner(app, path, None, Some(body)).await
}

/// 認証トークンつきでサーバーAPIエンドポイントを呼び出す
pub async fn call_with_token(
    app: &Router,
    path: &str,
    token: &str,
    body: Value,
) -> (StatusCode, Value) {
    call_inner(app, path, Some(token), Some(body)).await
}

/// 空ボディでサーバーAPIエンドポイントを呼び出す
pub async fn call_empty(app: &Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    call_inner(app, path, token, None).await
}

async fn call_inner(
    app: &Router,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/api/server{}", path))
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// 管理者としてログインしトークンを返す
pub async fn login_admin(app: &Router) -> String {
    login(app, "admin@example.com", "password123").await
}

/// 指定の資格情報でログインしトークンを返す
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        "/user/login",
        json!({"email": email, "password": password}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}
