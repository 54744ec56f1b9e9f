//! ローカルファイルシステム実装

use super::ObjectStorage;
use crate::common::error::AdminError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// ローカルディレクトリを使ったオブジェクトストレージ
///
/// キーはスラッシュ区切りの相対パスとして扱う（例: "post/abc.png"）。
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    /// 保存先ディレクトリと公開URLのベースを指定して作成
    pub fn new(root: impl Into<PathBuf>, public_base: String) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    /// キーをルート配下のパスへ解決する。上位ディレクトリへの
    /// 脱出を含むキーは拒否する。
    fn resolve(&self, key: &str) -> Result<PathBuf, AdminError> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if key.is_empty() || escapes {
            return Err(AdminError::Storage(format!("Invalid storage key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), AdminError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AdminError::Storage(format!("Failed to create directory: {}", e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AdminError::Storage(format!("Failed to write object {}: {}", key, e)))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AdminError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| AdminError::Storage(format!("Failed to read object {}: {}", key, e)))
    }

    async fn delete(&self, key: &str) -> Result<(), AdminError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AdminError::Storage(format!(
                "Failed to delete object {}: {}",
                key, e
            ))),
        }
    }

    fn file_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}
