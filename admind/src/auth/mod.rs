//! 認証・認可機能
//!
//! bcryptによるパスワードハッシュ、JWTの発行・検証、
//! リクエストヘッダーからのセッション復元、初回管理者作成。

/// パスワードハッシュ化と検証
pub mod password;

/// JWT生成と検証
pub mod jwt;

/// リクエストヘッダーからのセッション復元
pub mod session;

/// 初回起動時の管理者アカウント作成
pub mod bootstrap;

/// セッションJWTのクッキー名
pub const SESSION_COOKIE: &str = "admind_session";
