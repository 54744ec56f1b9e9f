//! 認証関連のデータモデル

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ユーザーロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// 一般ユーザー
    User,
    /// 管理者（ユーザー管理可能）
    Admin,
}

impl UserRole {
    /// DB格納用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// DB文字列からのパース（未知の値は一般ユーザー扱い）
    pub fn from_db(value: &str) -> Self {
        match value {
            "admin" => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

/// ユーザー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// ユーザーID
    pub id: Uuid,
    /// 表示名
    pub name: String,
    /// メールアドレス（一意）
    pub email: String,
    /// ユーザーロール
    pub role: UserRole,
    /// アカウント停止フラグ
    pub banned: bool,
    /// パスワードハッシュ（bcrypt）
    pub password_hash: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

/// JWTクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザーID
    pub sub: String,
    /// ユーザーロール
    pub role: UserRole,
    /// 有効期限（UNIXタイムスタンプ）
    pub exp: usize,
}

/// 認証済みセッション
///
/// トランスポート層がJWTから復元し、ディスパッチ時に
/// `ApiContext` へ渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// ユーザーID
    pub user_id: Uuid,
    /// ユーザーロール
    pub role: UserRole,
}

impl Session {
    /// 指定ロールのいずれかを持つか
    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }
}
