//! 一覧系エンドポイント共通のパラメーター
//!
//! 検索・ページング・カラムフィルター・ソートの組。ユーザー一覧と
//! 投稿一覧が同じ契約を共有する。フィールド名は管理画面のテーブル
//! コンポーネントが送るcamelCaseに合わせる。

use crate::server_api::schema::{FieldKind, InputSchema};
use serde::{Deserialize, Serialize};

/// ページサイズの既定値
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// 一覧取得パラメーター
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    /// 横断検索文字列
    pub search: Option<String>,
    /// ページ番号（1始まり、既定1）
    pub page: Option<u64>,
    /// 1ページあたりの件数（既定10）
    pub page_size: Option<u64>,
    /// カラムフィルター
    pub column_filters: Vec<ColumnFilter>,
    /// ソート指定（先頭のみ有効）
    pub sorting: Vec<SortSpec>,
}

impl ListParams {
    /// LIMIT句に渡す件数
    pub fn limit(&self) -> i64 {
        let size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        i64::try_from(size).unwrap_or(i64::MAX)
    }

    /// OFFSET句に渡す位置
    ///
    /// スキーマが受理する任意の正整数で飽和計算する（範囲外ページは
    /// 空の結果になるだけで、エラーにはしない）。
    pub fn offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1);
        let offset = (page - 1).saturating_mul(self.limit() as u64);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }
}

/// カラムフィルター条件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// カラムID
    pub id: String,
    /// フィルター値
    pub value: String,
}

/// ソート指定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    /// カラムID
    pub id: String,
    /// 降順フラグ
    pub desc: bool,
}

/// 一覧件数の応答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCount {
    /// 条件に一致する総件数
    pub count: i64,
}

/// 一覧パラメーター用の共通スキーマ
pub fn list_schema(column_ids: &'static [&'static str]) -> InputSchema {
    InputSchema::new()
        .optional("search", FieldKind::string())
        .optional("page", FieldKind::positive_int())
        .optional("pageSize", FieldKind::positive_int())
        .optional("columnFilters", FieldKind::filter_array(column_ids))
        .optional("sorting", FieldKind::sort_array(column_ids))
}
