//! クライアントスタブとトランスポート
//!
//! 同じ呼び出しコードを、サーバー内実行（インプロセス）と
//! ブラウザ相当のHTTP実行の両方で動かすための抽象。実行環境の
//! 分岐は関数内ではなく、アプリケーション組み立て時の
//! トランスポート選択で行う。

use crate::common::auth::Session;
use crate::common::error::AdminError;
use crate::server_api::context::ApiContext;
use crate::server_api::registry::normalize_path;
use crate::AppState;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// サーバーAPIのHTTPマウントプレフィックス
pub const API_MOUNT_PREFIX: &str = "/api/server";

/// 呼び出しトランスポート
///
/// `invoke(path, input) -> output` の一メソッドだけを持つ。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 登録パスのエンドポイントを入力つきで呼び出す
    async fn invoke(&self, path: &str, input: Value) -> Result<Value, AdminError>;
}

/// インプロセストランスポート
///
/// ネットワークを介さず、レジストリのエンドポイントを直接
/// ディスパッチする。業務関数のエラーは `AdminError` のまま
/// 呼び出し元へ伝播する（JSONエラーボディへの変換は起きない）。
pub struct DirectTransport {
    state: AppState,
    session: Option<Session>,
}

impl DirectTransport {
    /// サーバー状態とセッションからトランスポートを構築
    pub fn new(state: AppState, session: Option<Session>) -> Self {
        Self { state, session }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn invoke(&self, path: &str, input: Value) -> Result<Value, AdminError> {
        let normalized = normalize_path(path);
        let endpoint = self
            .state
            .registry
            .get_handler(&normalized)
            .ok_or_else(|| AdminError::NoHandler(normalized.clone()))?;
        let ctx = ApiContext::from_state(&self.state, self.session.clone());
        endpoint.dispatch(ctx, input).await
    }
}

/// HTTPトランスポート
///
/// `POST <base_url>/api/server<path>` に入力をJSONボディとして
/// 送信する。非2xxレスポンスはサーバーの `error` メッセージを
/// 持つエラーになる。
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// ベースURL（例: `http://127.0.0.1:8350`）からトランスポートを構築
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn invoke(&self, path: &str, input: Value) -> Result<Value, AdminError> {
        let url = format!(
            "{}{}{}",
            self.base_url,
            API_MOUNT_PREFIX,
            normalize_path(path)
        );

        let response = self
            .client
            .post(&url)
            .json(&input)
            .send()
            .await
            .map_err(|e| AdminError::Http(format!("API request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(AdminError::Http(message));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AdminError::Http(format!("Invalid response from {}: {}", path, e)))
    }
}

/// 呼び出しキャッシュつきクライアント
///
/// リクエスト（レンダリング）1回分のライフサイクルを想定した
/// スコープで生成し、同一入力の呼び出しを1回にまとめる。
/// キャッシュキーは `(パス, 入力の正規JSON)`。成功結果のみ保持し、
/// 明示的な無効化は行わない（スコープごと破棄する）。
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    // ロックを呼び出し中も保持することで、同一キーの並行呼び出しが
    // 業務関数を二重実行しないことを保証する。リクエストスコープの
    // 呼び出し数は少量なので直列化のコストは問題にならない。
    cache: Mutex<HashMap<String, Value>>,
}

impl ApiClient {
    /// トランスポートを指定してクライアントを作成
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// エンドポイントを呼び出す（同一入力はキャッシュ）
    pub async fn invoke(&self, path: &str, input: Value) -> Result<Value, AdminError> {
        let key = cache_key(path, &input);

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&key) {
            return Ok(cached.clone());
        }

        let output = self.transport.invoke(path, input).await?;
        cache.insert(key, output.clone());
        Ok(output)
    }
}

fn cache_key(path: &str, input: &Value) -> String {
    // serde_jsonのマップはキー順が安定しているため、
    // 同値の入力は同一のキー文字列になる
    format!("{}\u{0}{}", normalize_path(path), input)
}
