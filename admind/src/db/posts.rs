//! 投稿CRUD操作

use crate::common::error::AdminError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

/// 投稿
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// 投稿ID
    pub id: Uuid,
    /// タイトル
    pub title: String,
    /// 本文
    pub content: String,
    /// 保護フラグ（認証済みユーザーのみ閲覧可能）
    pub is_protected: bool,
    /// 添付画像のストレージキー（例: "post/<id>.png"）
    pub image: Option<String>,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

/// 一覧クエリで参照できるカラム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostColumn {
    /// タイトル
    Title,
    /// 本文
    Content,
    /// 保護フラグ
    Protected,
}

impl PostColumn {
    /// クライアント側のカラムIDからパース
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "title" => Some(PostColumn::Title),
            "content" => Some(PostColumn::Content),
            "isProtected" => Some(PostColumn::Protected),
            _ => None,
        }
    }

    fn sql_name(&self) -> &'static str {
        match self {
            PostColumn::Title => "title",
            PostColumn::Content => "content",
            PostColumn::Protected => "is_protected",
        }
    }
}

/// カラムフィルター条件
#[derive(Debug, Clone)]
pub struct PostColumnFilter {
    /// 対象カラム
    pub column: PostColumn,
    /// フィルター値（Protectedは "Protected" / それ以外で解釈）
    pub value: String,
}

/// 投稿一覧クエリ
#[derive(Debug, Clone)]
pub struct PostListQuery {
    /// title/content への横断検索
    pub search: Option<String>,
    /// カラムフィルター
    pub filters: Vec<PostColumnFilter>,
    /// ソート指定（カラム, 降順フラグ）。Noneなら作成日時降順
    pub sort: Option<(PostColumn, bool)>,
    /// 保護投稿を除外する（未認証の閲覧者向け）
    pub only_public: bool,
    /// 取得件数
    pub limit: i64,
    /// オフセット
    pub offset: i64,
}

const POST_COLUMNS: &str = "id, title, content, is_protected, image, created_at, updated_at";

/// 投稿を作成
///
/// IDは呼び出し側が採番する（画像キーがIDから導出されるため）。
pub async fn create(
    pool: &SqlitePool,
    id: Uuid,
    title: &str,
    content: &str,
    is_protected: bool,
    image: Option<&str>,
) -> Result<Post, AdminError> {
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO posts (id, title, content, is_protected, image, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(title)
    .bind(content)
    .bind(is_protected as i32)
    .bind(image)
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| AdminError::Database(format!("Failed to create post: {}", e)))?;

    Ok(Post {
        id,
        title: title.to_string(),
        content: content.to_string(),
        is_protected,
        image: image.map(String::from),
        created_at: now,
        updated_at: now,
    })
}

/// IDで投稿を検索
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Post>, AdminError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {} FROM posts WHERE id = ?",
        POST_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AdminError::Database(format!("Failed to find post: {}", e)))?;

    Ok(row.map(|r| r.into_post()))
}

/// 投稿を更新（画像キーは変更しない）
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    title: &str,
    content: &str,
    is_protected: bool,
) -> Result<(), AdminError> {
    let result = sqlx::query(
        "UPDATE posts SET title = ?, content = ?, is_protected = ?, updated_at = ? WHERE id = ?",
    )
    .bind(title)
    .bind(content)
    .bind(is_protected as i32)
    .bind(Utc::now().to_rfc3339())
    .bind(id.to_string())
    .execute(pool)
    .await
    .map_err(|e| AdminError::Database(format!("Failed to update post: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound(format!("Post not found: {}", id)));
    }
    Ok(())
}

/// 投稿を削除
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), AdminError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| AdminError::Database(format!("Failed to delete post: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound(format!("Post not found: {}", id)));
    }
    Ok(())
}

/// 検索・フィルター・ソート・ページング付きの投稿一覧
pub async fn list(pool: &SqlitePool, query: &PostListQuery) -> Result<Vec<Post>, AdminError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM posts", POST_COLUMNS));
    push_conditions(&mut qb, query);

    match query.sort {
        Some((column, desc)) => {
            qb.push(" ORDER BY ")
                .push(column.sql_name())
                .push(if desc { " DESC" } else { " ASC" });
        }
        None => {
            qb.push(" ORDER BY created_at DESC");
        }
    }

    qb.push(" LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset);

    let rows = qb
        .build_query_as::<PostRow>()
        .fetch_all(pool)
        .await
        .map_err(|e| AdminError::Database(format!("Failed to list posts: {}", e)))?;

    Ok(rows.into_iter().map(|r| r.into_post()).collect())
}

/// 一覧クエリと同じ条件での総件数
pub async fn count(pool: &SqlitePool, query: &PostListQuery) -> Result<i64, AdminError> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts");
    push_conditions(&mut qb, query);

    let total: i64 = qb
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|e| AdminError::Database(format!("Failed to count posts: {}", e)))?;

    Ok(total)
}

fn push_conditions(qb: &mut QueryBuilder<'_, Sqlite>, query: &PostListQuery) {
    let mut has_where = false;

    fn and(qb: &mut QueryBuilder<'_, Sqlite>, has_where: &mut bool) {
        if *has_where {
            qb.push(" AND ");
        } else {
            qb.push(" WHERE ");
            *has_where = true;
        }
    }

    if query.only_public {
        and(qb, &mut has_where);
        qb.push("is_protected = 0");
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        and(qb, &mut has_where);
        let pattern = format!("%{}%", search);
        qb.push("(title LIKE ")
            .push_bind(pattern.clone())
            .push(" OR content LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    for filter in &query.filters {
        and(qb, &mut has_where);
        match filter.column {
            PostColumn::Protected => {
                if filter.value == "Protected" {
                    qb.push("is_protected = 1");
                } else {
                    qb.push("is_protected = 0");
                }
            }
            column => {
                qb.push(column.sql_name())
                    .push(" LIKE ")
                    .push_bind(format!("%{}%", filter.value));
            }
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: String,
    title: String,
    content: String,
    is_protected: i32,
    image: Option<String>,
    created_at: String,
    updated_at: String,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: Uuid::parse_str(&self.id).unwrap(),
            title: self.title,
            content: self.content,
            is_protected: self.is_protected != 0,
            image: self.image,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .unwrap()
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&self.updated_at)
                .unwrap()
                .with_timezone(&Utc),
        }
    }
}
