//! admind - 管理画面バックエンドサーバー
//!
//! ユーザー・投稿のCRUDをサーバーAPIレジストリ経由で公開する

#![warn(missing_docs)]

/// 共通型定義（エラー型、認証データモデル）
pub mod common;

/// サーバーAPIレジストリ・ディスパッチ層
pub mod server_api;

/// 業務関数（ユーザー・投稿）
pub mod features;

/// データベースアクセス
pub mod db;

/// オブジェクトストレージ
pub mod storage;

/// 認証・認可機能
pub mod auth;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// CLIインターフェース
pub mod cli;

/// サーバー初期化ロジック
pub mod bootstrap;

/// axumサーバー起動・シャットダウン
pub mod server;

/// Cooperative shutdown controller
pub mod shutdown;

use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// JWT秘密鍵
    pub jwt_secret: String,
    /// オブジェクトストレージ
    pub storage: Arc<dyn storage::ObjectStorage>,
    /// サーバーAPIレジストリ（起動時に構築、以後不変）
    pub registry: Arc<server_api::registry::ApiRegistry>,
    /// Cooperative shutdown controller
    pub shutdown: shutdown::ShutdownController,
}
