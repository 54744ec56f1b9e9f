//! オブジェクトストレージ抽象
//!
//! 投稿画像などのバイナリをキー付きで保存する。実体はローカル
//! ファイルシステム実装（[`local::LocalStorage`]）のみだが、
//! S3互換ストアへの差し替えを想定してトレイトで切っている。

/// ローカルファイルシステム実装
pub mod local;

use crate::common::error::AdminError;
use async_trait::async_trait;

/// キー・バリュー型のオブジェクトストレージ
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// キーにバイト列を保存する（既存キーは上書き）
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), AdminError>;

    /// キーのバイト列を取得する
    async fn get(&self, key: &str) -> Result<Vec<u8>, AdminError>;

    /// キーを削除する（存在しないキーはエラーにしない）
    async fn delete(&self, key: &str) -> Result<(), AdminError>;

    /// キーに対応する公開URLを返す
    fn file_url(&self, key: &str) -> String;
}
