//! エンドポイントファクトリ
//!
//! 業務関数 `(ApiContext, I) -> O` を、HTTPハンドラーとしても
//! クライアントスタブとしても使える記述子に包む。
//!
//! ディスパッチは常に同じ順序で行う:
//! アクセスゲート → スキーマ検証 → 型付きデシリアライズ → 業務関数 →
//! JSONシリアライズ。スキーマ検証に失敗した入力が業務関数へ届くことはない。

use crate::common::auth::UserRole;
use crate::common::error::AdminError;
use crate::server_api::client::ApiClient;
use crate::server_api::context::ApiContext;
use crate::server_api::schema::InputSchema;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// アクセスゲート
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 認証不要
    Public,
    /// 認証必須（ロールは問わない）
    Authenticated,
    /// 指定ロールのいずれかが必須
    Roles(&'static [UserRole]),
}

/// 型消去された業務関数
pub type BoxedApiFn =
    Arc<dyn Fn(ApiContext, Value) -> BoxFuture<'static, Result<Value, AdminError>> + Send + Sync>;

/// 登録可能なエンドポイント記述子
///
/// パス・スキーマ・アクセスゲート・型消去ハンドラーの組。
/// [`super::manifest::api_manifest`] がこれを集め、レジストリに畳み込む。
#[derive(Clone)]
pub struct EndpointDescriptor {
    path: String,
    schema: Option<InputSchema>,
    access: Access,
    handler: BoxedApiFn,
}

impl EndpointDescriptor {
    /// 登録パス（先頭スラッシュ付き）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// アクセスゲート
    pub fn access(&self) -> Access {
        self.access
    }

    /// 入力を検証し業務関数を実行する
    ///
    /// トランスポート（HTTPルート・インプロセス呼び出し）の共通経路。
    pub async fn dispatch(&self, ctx: ApiContext, input: Value) -> Result<Value, AdminError> {
        match self.access {
            Access::Public => {}
            Access::Authenticated => {
                ctx.require_session()?;
            }
            Access::Roles(roles) => {
                ctx.require_role(roles)?;
            }
        }

        if let Some(schema) = &self.schema {
            schema.validate(&input).map_err(AdminError::Validation)?;
        }

        (self.handler)(ctx, input).await
    }
}

/// 型付きのサーバーAPI定義
///
/// 業務関数・パス・スキーマ・アクセスゲートを束ね、
/// `descriptor()` でレジストリ登録用に型消去し、
/// `call()` でクライアントスタブとして呼び出す。
pub struct ServerApi<I, O> {
    path: &'static str,
    schema: Option<InputSchema>,
    access: Access,
    handler: BoxedApiFn,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O> ServerApi<I, O>
where
    I: Serialize + DeserializeOwned + Send + 'static,
    O: Serialize + DeserializeOwned + Send + 'static,
{
    /// 業務関数をサーバーAPIとして包む
    ///
    /// `path` はアプリケーション全体で一意であること。重複は
    /// レジストリ構築時に起動エラーとして検出される。
    pub fn new<F, Fut>(path: &'static str, function: F) -> Self
    where
        F: Fn(ApiContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, AdminError>> + Send + 'static,
    {
        let function = Arc::new(function);
        let handler: BoxedApiFn = Arc::new(move |ctx: ApiContext, input: Value| {
            let function = Arc::clone(&function);
            Box::pin(async move {
                // スキーマ検証後にここで失敗するのはスキーマと型定義の不一致
                let typed = serde_json::from_value::<I>(input).map_err(|e| {
                    AdminError::Internal(format!(
                        "Input payload does not match endpoint type: {}",
                        e
                    ))
                })?;
                let output = function(ctx, typed).await?;
                serde_json::to_value(output).map_err(AdminError::from)
            })
        });

        Self {
            path,
            schema: None,
            access: Access::Public,
            handler,
            _marker: PhantomData,
        }
    }

    /// 入力スキーマを設定
    pub fn with_schema(mut self, schema: InputSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// アクセスゲートを設定
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// 登録パス
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// レジストリ登録用の型消去記述子を生成
    pub fn descriptor(&self) -> EndpointDescriptor {
        EndpointDescriptor {
            path: crate::server_api::registry::normalize_path(self.path),
            schema: self.schema.clone(),
            access: self.access,
            handler: Arc::clone(&self.handler),
        }
    }

    /// クライアントスタブとして呼び出す
    ///
    /// 実際の実行経路（インプロセスかHTTPか）は `client` の
    /// トランスポートが決める。同一入力の呼び出しは `client` の
    /// キャッシュで重複排除される。
    pub async fn call(&self, client: &ApiClient, input: I) -> Result<O, AdminError> {
        let value = serde_json::to_value(input)?;
        let output = client.invoke(self.path, value).await?;
        serde_json::from_value(output).map_err(AdminError::from)
    }
}
