//! サーバーAPIディスパッチの契約テスト
//!
//! POST /api/server/<path> の共通挙動（メソッド・未知パス・
//! 不正ボディ・検証エラー・正常応答）を実アプリで検証する。

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::support::app::{call, call_empty, call_with_token, create_test_app,
    create_test_app_with_admin, login_admin};

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _state) = create_test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_post_method_returns_405_with_contract_body() {
    let (app, _state) = create_test_app().await;

    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/api/server/post/list")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Only POST method is allowed");
    }
}

#[tokio::test]
async fn unknown_path_returns_404_naming_the_path() {
    let (app, _state) = create_test_app().await;
    let (status, body) = call(&app, "/no/such/endpoint", json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No handler found for path: /no/such/endpoint");
}

#[tokio::test]
async fn invalid_json_body_returns_400() {
    let (app, _state) = create_test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/server/post/list")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid JSON body");
}

#[tokio::test]
async fn empty_body_is_treated_as_empty_object() {
    let (app, _state) = create_test_app().await;
    // /post/list は全フィールド任意なので {} 扱いで成功する
    let (status, body) = call_empty(&app, "/post/list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn validation_failure_returns_field_keyed_errors() {
    let (app, _state) = create_test_app().await;
    let (status, body) = call(&app, "/post/get", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
    assert_eq!(body["details"]["id"]["_errors"][0], "Required");
}

#[tokio::test]
async fn validation_reports_type_mismatch_per_field() {
    let (app, _state) = create_test_app().await;
    let (status, body) = call(&app, "/post/get", json!({"id": 42})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["id"]["_errors"][0],
        "Expected string, received number"
    );
}

#[tokio::test]
async fn fractional_page_is_a_validation_error() {
    let (app, _state) = create_test_app().await;
    // 小数ページは型付き層へ届く前に400になる
    let (status, body) = call(&app, "/post/list", json!({"page": 1.5})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
    assert_eq!(
        body["details"]["page"]["_errors"][0],
        "Expected integer, received float"
    );

    let (status, body) = call(&app, "/post/list", json!({"page": 1})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}

#[tokio::test]
async fn valid_input_round_trips_business_output() {
    let (app, _state) = create_test_app_with_admin().await;
    let token = login_admin(&app).await;

    let (status, created) = call_with_token(
        &app,
        "/post/create",
        &token,
        json!({"title": "Round trip", "content": "body text"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Round trip");
    assert_eq!(created["isProtected"], false);

    let (status, fetched) = call(&app, "/post/get", json!({"id": created["id"]})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn internal_errors_hide_details_behind_generic_message() {
    let (app, state) = create_test_app().await;
    // テーブルを落として500系を誘発する
    sqlx::query("DROP TABLE posts")
        .execute(&state.db_pool)
        .await
        .unwrap();

    let (status, body) = call(&app, "/post/list", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}
