//! 共通型定義
//!
//! エラー型と認証関連のデータモデル

/// エラー型定義
pub mod error;

/// 認証関連のデータモデル
pub mod auth;
