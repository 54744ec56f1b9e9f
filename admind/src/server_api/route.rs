//! キャッチオールトランスポートルート
//!
//! `POST /api/server/<任意のパス>` を受け、セグメントから論理パスを
//! 再構成してレジストリのエンドポイントへ委譲する。

use crate::auth::session::extract_session;
use crate::common::error::AdminError;
use crate::server_api::context::ApiContext;
use crate::AppState;
use axum::body::to_bytes;
use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// アプリケーションルーターを構築する
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// サーバーAPIのキャッチオールルート
pub fn router() -> Router<AppState> {
    Router::new().route("/api/server/*path", any(dispatch))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// キャッチオールディスパッチハンドラー
///
/// 1. POST以外は405
/// 2. 論理パス（`/` + 残りセグメント）でレジストリを検索、なければ404
/// 3. ボディをJSONとして解釈（空は `{}`、不正は400）
/// 4. JWTからセッションを復元（無効・欠落はセッションなしとして続行）
/// 5. エンドポイントへ委譲し、結果またはエラー契約ボディを返す
async fn dispatch(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request,
) -> Response {
    if request.method() != Method::POST {
        return AdminError::MethodNotAllowed.into_response();
    }

    let logical_path = format!("/{}", path);
    let Some(endpoint) = state.registry.get_handler(&logical_path) else {
        return AdminError::NoHandler(logical_path).into_response();
    };

    let headers = request.headers().clone();
    let body = match to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read request body for {}: {}", logical_path, e);
            return AdminError::Internal("Failed to read request body".to_string())
                .into_response();
        }
    };

    let input: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(_) => return AdminError::InvalidJsonBody.into_response(),
        }
    };

    let session = extract_session(&headers, &state.jwt_secret);
    let ctx = ApiContext::from_state(&state, session);

    match endpoint.dispatch(ctx, input).await {
        Ok(output) => (StatusCode::OK, Json(output)).into_response(),
        Err(e) => {
            if e.status_code().is_server_error() {
                error!("API error at {}: {}", logical_path, e);
            }
            e.into_response()
        }
    }
}
