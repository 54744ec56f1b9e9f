//! 業務関数の実行コンテキスト

use crate::common::auth::{Session, UserRole};
use crate::common::error::AdminError;
use crate::storage::ObjectStorage;
use crate::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;

/// 業務関数に渡される実行コンテキスト
///
/// リクエストごとに構築される。`session` はトランスポート層が
/// JWTから復元した認証情報（未認証なら `None`）。
#[derive(Clone)]
pub struct ApiContext {
    /// データベース接続プール
    pub db: SqlitePool,
    /// オブジェクトストレージ
    pub storage: Arc<dyn ObjectStorage>,
    /// JWT秘密鍵（ログインでのトークン発行に使用）
    pub jwt_secret: String,
    /// 認証済みセッション
    pub session: Option<Session>,
}

impl ApiContext {
    /// `AppState` とセッションからコンテキストを構築
    pub fn from_state(state: &AppState, session: Option<Session>) -> Self {
        Self {
            db: state.db_pool.clone(),
            storage: state.storage.clone(),
            jwt_secret: state.jwt_secret.clone(),
            session,
        }
    }

    /// 認証済みセッションを要求
    pub fn require_session(&self) -> Result<&Session, AdminError> {
        self.session
            .as_ref()
            .ok_or_else(|| AdminError::Authentication("Not signed in".to_string()))
    }

    /// 指定ロールのいずれかを持つセッションを要求
    pub fn require_role(&self, roles: &[UserRole]) -> Result<&Session, AdminError> {
        let session = self.require_session()?;
        if !session.has_any_role(roles) {
            return Err(AdminError::Authorization(
                "User not authorized".to_string(),
            ));
        }
        Ok(session)
    }
}
