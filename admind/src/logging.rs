//! ロギング初期化
//!
//! `ADMIND_LOG` でフィルターを指定する（未設定時は `info`）。

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// グローバルのtracingサブスクライバーを初期化する
///
/// 二重初期化はエラーになる（テストから複数回呼ばない想定）。
pub fn init() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_env("ADMIND_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
