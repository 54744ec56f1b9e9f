//! パス→エンドポイントのレジストリ
//!
//! プロセス全体のエンドポイントディレクトリ。起動時に
//! マニフェストから一度だけ構築され、以後は読み取り専用。
//! パス重複は構築時にエラーとなり、起動を失敗させる。

use crate::common::error::AdminError;
use crate::server_api::endpoint::EndpointDescriptor;
use std::collections::BTreeMap;

/// パスを正規化する（先頭スラッシュを保証）
///
/// 末尾スラッシュや大文字小文字の正規化は行わない。
/// ルックアップは正規化後の完全一致。
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// レジストリビルダー
///
/// 登録を集めてから [`ApiRegistry`] に畳み込む。重複パスは
/// 登録時点で検出する。
#[derive(Default)]
pub struct RegistryBuilder {
    endpoints: BTreeMap<String, EndpointDescriptor>,
}

impl RegistryBuilder {
    /// 空のビルダーを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// エンドポイントを登録する
    ///
    /// 同一の正規化パスが既に登録済みの場合は
    /// `AdminError::DuplicateEndpoint` を返す。
    pub fn register(&mut self, descriptor: EndpointDescriptor) -> Result<(), AdminError> {
        let path = normalize_path(descriptor.path());
        if self.endpoints.contains_key(&path) {
            return Err(AdminError::DuplicateEndpoint(path));
        }
        self.endpoints.insert(path, descriptor);
        Ok(())
    }

    /// 不変のレジストリへ畳み込む
    pub fn build(self) -> ApiRegistry {
        ApiRegistry {
            endpoints: self.endpoints,
        }
    }
}

/// サーバーAPIレジストリ
///
/// 正規化パス → エンドポイント記述子の不変マップ。
pub struct ApiRegistry {
    endpoints: BTreeMap<String, EndpointDescriptor>,
}

impl std::fmt::Debug for ApiRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRegistry")
            .field("paths", &self.endpoints.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ApiRegistry {
    /// 記述子リストからレジストリを構築する
    ///
    /// マニフェスト内にパス重複があればエラー（起動失敗）。
    pub fn build(manifest: Vec<EndpointDescriptor>) -> Result<Self, AdminError> {
        let mut builder = RegistryBuilder::new();
        for descriptor in manifest {
            builder.register(descriptor)?;
        }
        Ok(builder.build())
    }

    /// パスに対応するエンドポイントを取得（完全一致）
    pub fn get_handler(&self, path: &str) -> Option<&EndpointDescriptor> {
        self.endpoints.get(&normalize_path(path))
    }

    /// 登録済みエンドポイントの一覧（診断用）
    pub fn all_endpoints(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.values()
    }

    /// 登録済みエンドポイント数
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// エンドポイントが1件もないか
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
