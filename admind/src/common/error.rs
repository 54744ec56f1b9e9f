//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `AdminError`はサーバーAPIディスパッチ層のHTTP契約
//! （`{"error": ...}` ボディとステータスコード）への変換も担う。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// フィールド単位のバリデーションエラー
///
/// フィールド名 → エラーメッセージ一覧。ワイヤー上は
/// `{"<field>": {"_errors": ["...", ...]}}` 形式で返す。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// 空のエラー集合を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// フィールドにエラーメッセージを追加
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// エラーが1件もないか
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// フィールドのエラーメッセージ一覧を取得
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(|v| v.as_slice())
    }

    /// `details` オブジェクトへシリアライズ
    pub fn to_details(&self) -> serde_json::Value {
        let mut details = serde_json::Map::new();
        for (field, messages) in &self.errors {
            details.insert(field.clone(), json!({ "_errors": messages }));
        }
        serde_json::Value::Object(details)
    }
}

/// admind統一エラー型
#[derive(Debug, Error)]
pub enum AdminError {
    /// 入力バリデーション失敗
    #[error("Invalid input")]
    Validation(ValidationErrors),

    /// リクエストボディがJSONとして不正
    #[error("Invalid JSON body")]
    InvalidJsonBody,

    /// POST以外のHTTPメソッド
    #[error("Only POST method is allowed")]
    MethodNotAllowed,

    /// パスに対応するハンドラーが未登録
    #[error("No handler found for path: {0}")]
    NoHandler(String),

    /// エンドポイントパスの重複登録（起動時に検出）
    #[error("Duplicate server API path: {0}")]
    DuplicateEndpoint(String),

    /// リソースが見つからない
    #[error("Not found: {0}")]
    NotFound(String),

    /// 認証エラー
    #[error("{0}")]
    Authentication(String),

    /// 認可エラー
    #[error("{0}")]
    Authorization(String),

    /// 重複リソースなどの競合
    #[error("{0}")]
    Conflict(String),

    /// データベースエラー
    #[error("Database error: {0}")]
    Database(String),

    /// パスワードハッシュエラー
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// JWTエラー
    #[error("JWT error: {0}")]
    Jwt(String),

    /// ストレージエラー
    #[error("Storage error: {0}")]
    Storage(String),

    /// HTTPトランスポートエラー（クライアントスタブ側）
    #[error("{0}")]
    Http(String),

    /// シリアライゼーションエラー
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 内部エラー
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    /// HTTPステータスコードへのマッピング
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Validation(_) | AdminError::InvalidJsonBody => StatusCode::BAD_REQUEST,
            AdminError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AdminError::NoHandler(_) | AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AdminError::Authorization(_) => StatusCode::FORBIDDEN,
            AdminError::Conflict(_) => StatusCode::CONFLICT,
            AdminError::DuplicateEndpoint(_)
            | AdminError::Database(_)
            | AdminError::PasswordHash(_)
            | AdminError::Jwt(_)
            | AdminError::Storage(_)
            | AdminError::Http(_)
            | AdminError::Serialization(_)
            | AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 外部クライアント向けの安全なエラーメッセージ
    ///
    /// データベースやシリアライゼーションの内部詳細は晒さない。
    /// 完全なエラーはサーバー側でログに残す。
    pub fn external_message(&self) -> String {
        match self {
            AdminError::Database(_) | AdminError::Serialization(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AdminError::Validation(errors) => json!({
                "error": "Invalid input",
                "details": errors.to_details(),
            }),
            other => json!({ "error": other.external_message() }),
        };
        (status, Json(body)).into_response()
    }
}
