//! インプロセストランスポートのテスト
//!
//! ネットワークを介さずにエンドポイントを実行し、エラーが
//! `AdminError` のまま伝播することを確認する。

use std::sync::Arc;

use admind::common::auth::Session;
use admind::common::error::AdminError;
use admind::features::table::ListParams;
use admind::features::user::actions as user_actions;
use admind::server_api::client::{ApiClient, DirectTransport};
use serde_json::json;

use crate::support::app::create_test_app_with_admin;

#[tokio::test]
async fn executes_endpoints_without_network_io() {
    // HTTPリスナーは一切起動していない
    let (_app, state) = create_test_app_with_admin().await;

    let client = ApiClient::new(Arc::new(DirectTransport::new(state, None)));
    let posts = admind::features::post::actions::get_post_list_api()
        .call(&client, ListParams::default())
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn errors_propagate_as_typed_errors_not_http_bodies() {
    let (_app, state) = create_test_app_with_admin().await;

    let client = ApiClient::new(Arc::new(DirectTransport::new(state, None)));
    let err = user_actions::get_user_list_api()
        .call(&client, ListParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Authentication(_)));
}

#[tokio::test]
async fn session_flows_through_to_access_gates() {
    let (_app, state) = create_test_app_with_admin().await;
    let admin = admind::db::users::find_by_email(&state.db_pool, "admin@example.com")
        .await
        .unwrap()
        .unwrap();
    let session = Session {
        user_id: admin.id,
        role: admin.role,
    };

    let client = ApiClient::new(Arc::new(DirectTransport::new(state, Some(session))));
    let users = user_actions::get_user_list_api()
        .call(&client, ListParams::default())
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "admin@example.com");
}

#[tokio::test]
async fn schema_validation_still_applies_in_process() {
    let (_app, state) = create_test_app_with_admin().await;

    // 型付きスタブを迂回して生のJSONを流し込む
    let client = ApiClient::new(Arc::new(DirectTransport::new(state, None)));
    let err = client
        .invoke("/post/get", json!({"id": "not-a-uuid"}))
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Validation(_)));
}

#[tokio::test]
async fn unknown_path_surfaces_no_handler_error() {
    let (_app, state) = create_test_app_with_admin().await;

    let client = ApiClient::new(Arc::new(DirectTransport::new(state, None)));
    let err = client.invoke("/missing", json!({})).await.unwrap_err();
    assert!(matches!(err, AdminError::NoHandler(_)));
}

#[tokio::test]
async fn memoization_executes_business_function_once_per_input() {
    let (_app, state) = create_test_app_with_admin().await;
    let admin = admind::db::users::find_by_email(&state.db_pool, "admin@example.com")
        .await
        .unwrap()
        .unwrap();
    let session = Session {
        user_id: admin.id,
        role: admin.role,
    };

    let client = ApiClient::new(Arc::new(DirectTransport::new(state.clone(), Some(session))));
    let params = json!({"title": "Once", "content": "only"});

    // 再実行されていれば2つ目の投稿（別ID）が作られるはず
    let first = client.invoke("/post/create", params.clone()).await.unwrap();
    let second = client.invoke("/post/create", params).await.unwrap();
    assert_eq!(first["id"], second["id"]);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(&state.db_pool)
        .await
        .unwrap();
    assert_eq!(total, 1);
}
