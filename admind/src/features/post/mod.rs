//! 投稿管理機能

/// 業務関数とエンドポイント定義
pub mod actions;
