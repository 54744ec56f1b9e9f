//! 初回起動時の管理者アカウント作成
//!
//! 環境変数から管理者ユーザーを作成する

use crate::auth::password::hash_password;
use crate::common::auth::UserRole;
use crate::common::error::AdminError;
use crate::config::get_env;
use crate::db;

/// 環境変数から管理者を作成
///
/// # Environment Variables
/// * `ADMIND_ADMIN_EMAIL` - 管理者メールアドレス（省略時: "admin@example.com"）
/// * `ADMIND_ADMIN_NAME` - 管理者表示名（省略時: "admin"）
/// * `ADMIND_ADMIN_PASSWORD` - 管理者パスワード（未設定なら作成しない）
///
/// # Returns
/// * `Ok(Some(email))` - 管理者作成成功（既存の場合も含む）
/// * `Ok(None)` - ADMIND_ADMIN_PASSWORDが未設定（作成しない）
/// * `Err(AdminError)` - 作成失敗
pub async fn create_admin_from_env(pool: &sqlx::SqlitePool) -> Result<Option<String>, AdminError> {
    let password = match get_env("ADMIND_ADMIN_PASSWORD") {
        Some(p) if !p.is_empty() => p,
        _ => {
            tracing::debug!("ADMIND_ADMIN_PASSWORD not set, skipping admin creation from env");
            return Ok(None);
        }
    };

    let email = get_env("ADMIND_ADMIN_EMAIL").unwrap_or_else(|| "admin@example.com".to_string());
    let name = get_env("ADMIND_ADMIN_NAME").unwrap_or_else(|| "admin".to_string());

    if db::users::find_by_email(pool, &email).await?.is_some() {
        tracing::warn!("Admin user {} already exists, skipping creation", email);
        return Ok(Some(email));
    }

    let password_hash = hash_password(&password)?;
    let user = db::users::create(pool, &name, &email, &password_hash, UserRole::Admin).await?;
    tracing::info!("Created admin user from env: email={}", user.email);
    Ok(Some(user.email))
}
