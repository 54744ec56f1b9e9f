//! Configuration management via environment variables
//!
//! All runtime knobs are read from `ADMIND_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;

/// Get an environment variable
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Get an environment variable with a default value
pub fn get_env_or(name: &str, default: &str) -> String {
    get_env(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable parsed to a specific type
///
/// Falls back to `default` when the variable is unset or fails to parse;
/// a parse failure is logged as a warning.
pub fn get_env_parse<T: FromStr>(name: &str, default: T) -> T {
    match get_env(name) {
        Some(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(
                    "Environment variable '{}' has invalid value '{}', using default",
                    name,
                    value
                );
                default
            }
        },
        None => default,
    }
}

/// HTTPサーバー設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host: String,
    /// リッスンポート
    pub port: u16,
    /// データベースURL
    pub database_url: String,
}

impl ServerConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        Self {
            host: get_env_or("ADMIND_HOST", "0.0.0.0"),
            port: get_env_parse("ADMIND_PORT", 8080),
            database_url: get_env_or("ADMIND_DATABASE_URL", "sqlite:admind.db"),
        }
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// オブジェクトストレージ設定
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// 保存先ディレクトリ
    pub root: PathBuf,
    /// 公開URLのベース
    pub public_base_url: String,
}

impl StorageConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        Self {
            root: PathBuf::from(get_env_or("ADMIND_STORAGE_DIR", "objects")),
            public_base_url: get_env_or("ADMIND_PUBLIC_BASE_URL", "http://localhost:8080/files"),
        }
    }
}
