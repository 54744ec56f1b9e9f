//! サーバーAPIレジストリ・ディスパッチ層
//!
//! 業務関数をHTTPエンドポイントとクライアントスタブの両方として公開する。
//!
//! - [`registry`] — パス→エンドポイントの不変マップ。起動時に
//!   [`manifest`] の記述子リストから構築し、パス重複は起動失敗にする。
//! - [`endpoint`] — 業務関数を型消去した記述子に包むファクトリ。
//!   スキーマ検証・ロールゲート・JSON変換をディスパッチ前後に行う。
//! - [`route`] — `/api/server/*path` のキャッチオールルート。
//! - [`client`] — トランスポート抽象（インプロセス / HTTP）と
//!   リクエストスコープの呼び出しキャッシュ。

/// パス→エンドポイントのレジストリ
pub mod registry;

/// 入力スキーマ検証
pub mod schema;

/// エンドポイントファクトリ
pub mod endpoint;

/// エンドポイントマニフェスト（全登録の唯一の起点）
pub mod manifest;

/// キャッチオールトランスポートルート
pub mod route;

/// クライアントスタブとトランスポート
pub mod client;

/// 業務関数の実行コンテキスト
pub mod context;
