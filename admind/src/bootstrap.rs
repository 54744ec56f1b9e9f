//! サーバー初期化ロジック
//!
//! データベース接続、マイグレーション、レジストリ構築、初期管理者作成など
//! サーバー起動に必要なコンポーネントの初期化を担当する。

use crate::config::{ServerConfig, StorageConfig};
use crate::server_api::manifest::api_manifest;
use crate::server_api::registry::ApiRegistry;
use crate::storage::local::LocalStorage;
use crate::{auth, AppState};
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// サーバー初期化を実行する
///
/// エンドポイントマニフェストのパス重複はここでエラーになり、
/// サーバーは起動しない。
pub async fn initialize(config: &ServerConfig) -> AppState {
    info!("admind v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = init_db_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // マイグレーションを実行
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // 管理者が存在しない場合は作成
    auth::bootstrap::create_admin_from_env(&db_pool)
        .await
        .expect("Failed to create initial admin");

    // JWT秘密鍵を取得または生成
    let jwt_secret = crate::config::get_env("ADMIND_JWT_SECRET").unwrap_or_else(|| {
        tracing::warn!("ADMIND_JWT_SECRET not set, generating an ephemeral secret");
        generate_secret()
    });

    let storage_config = StorageConfig::from_env();
    let storage = Arc::new(LocalStorage::new(
        storage_config.root,
        storage_config.public_base_url,
    ));

    // エンドポイントマニフェストからレジストリを構築（重複パスは起動失敗）
    let registry = ApiRegistry::build(api_manifest()).expect("Invalid endpoint manifest");
    info!("Server API registry built with {} endpoints", registry.len());

    AppState {
        db_pool,
        jwt_secret,
        storage,
        registry: Arc::new(registry),
        shutdown: crate::shutdown::ShutdownController::default(),
    }
}

/// データベース接続プールを作成する
pub async fn init_db_pool(database_url: &str) -> sqlx::Result<sqlx::SqlitePool> {
    // SQLiteファイルはディレクトリが存在しないと作成できないため、先に作成しておく
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        // `sqlite::memory:` のような特殊指定はスキップ
        if !path.starts_with(':') {
            let normalized = path.trim_start_matches("//");
            let path_without_params = normalized.split('?').next().unwrap_or(normalized);
            let db_path = std::path::Path::new(path_without_params);
            if let Some(parent) = db_path.parent() {
                if let Err(err) = std::fs::create_dir_all(parent) {
                    panic!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        err
                    );
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    sqlx::SqlitePool::connect_with(connect_options).await
}

fn generate_secret() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
