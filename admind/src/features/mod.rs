//! 業務機能
//!
//! 各機能はエンドポイント定義（`*_api()`）と業務関数の組で構成する。
//! エンドポイントは [`crate::server_api::manifest`] に列挙され、起動時に
//! レジストリへ畳み込まれる。

/// 投稿管理
pub mod post;

/// 一覧系エンドポイント共通のパラメーター
pub mod table;

/// ユーザー管理
pub mod user;

use serde::{Deserialize, Serialize};

/// 入力を取らないエンドポイント用の空パラメーター
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoParams {}

/// メッセージのみの応答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionMessage {
    /// 結果メッセージ
    pub message: String,
}

impl ActionMessage {
    /// メッセージ応答を作成
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
