//! ユーザーCRUD操作

use crate::common::auth::{User, UserRole};
use crate::common::error::AdminError;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

/// 一覧クエリで参照できるカラム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    /// 表示名
    Name,
    /// メールアドレス
    Email,
    /// ロール
    Role,
    /// ステータス（bannedフラグ由来）
    Status,
}

impl UserColumn {
    /// クライアント側のカラムIDからパース
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "name" => Some(UserColumn::Name),
            "email" => Some(UserColumn::Email),
            "role" => Some(UserColumn::Role),
            "status" => Some(UserColumn::Status),
            _ => None,
        }
    }

    fn sql_name(&self) -> &'static str {
        match self {
            UserColumn::Name => "name",
            UserColumn::Email => "email",
            UserColumn::Role => "role",
            UserColumn::Status => "banned",
        }
    }
}

/// カラムフィルター条件
#[derive(Debug, Clone)]
pub struct UserColumnFilter {
    /// 対象カラム
    pub column: UserColumn,
    /// フィルター値（Statusは "Active" / それ以外で解釈）
    pub value: String,
}

/// ユーザー一覧クエリ
#[derive(Debug, Clone)]
pub struct UserListQuery {
    /// name/email/role への横断検索
    pub search: Option<String>,
    /// カラムフィルター
    pub filters: Vec<UserColumnFilter>,
    /// ソート指定（カラム, 降順フラグ）。Noneなら作成日時降順
    pub sort: Option<(UserColumn, bool)>,
    /// 取得件数
    pub limit: i64,
    /// オフセット
    pub offset: i64,
}

const USER_COLUMNS: &str =
    "id, name, email, role, banned, password_hash, created_at, updated_at";

/// ユーザーを作成
///
/// メールアドレス重複は `AdminError::Conflict` になる。
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<User, AdminError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, name, email, role, banned, password_hash, created_at, updated_at)
         VALUES (?, ?, ?, ?, 0, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(email)
    .bind(role.as_str())
    .bind(password_hash)
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AdminError::Conflict(format!("Email '{}' is already in use", email))
        } else {
            AdminError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
        banned: false,
        password_hash: password_hash.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// IDで有効な（停止されていない）ユーザーを検索
pub async fn find_active_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, AdminError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE id = ? AND banned = 0",
        USER_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AdminError::Database(format!("Failed to find user: {}", e)))?;

    Ok(row.map(|r| r.into_user()))
}

/// メールアドレスでユーザーを検索
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AdminError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| AdminError::Database(format!("Failed to find user: {}", e)))?;

    Ok(row.map(|r| r.into_user()))
}

/// ユーザーを更新
///
/// `password_hash` が `Some` の場合のみパスワードを変更する。
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    name: &str,
    email: &str,
    role: UserRole,
    password_hash: Option<&str>,
) -> Result<(), AdminError> {
    let now = Utc::now().to_rfc3339();

    let result = match password_hash {
        Some(hash) => sqlx::query(
            "UPDATE users SET name = ?, email = ?, role = ?, password_hash = ?, updated_at = ? WHERE id = ?",
        )
        .bind(name)
        .bind(email)
        .bind(role.as_str())
        .bind(hash)
        .bind(&now)
        .bind(id.to_string())
        .execute(pool)
        .await,
        None => sqlx::query(
            "UPDATE users SET name = ?, email = ?, role = ?, updated_at = ? WHERE id = ?",
        )
        .bind(name)
        .bind(email)
        .bind(role.as_str())
        .bind(&now)
        .bind(id.to_string())
        .execute(pool)
        .await,
    };

    let result = result.map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AdminError::Conflict(format!("Email '{}' is already in use", email))
        } else {
            AdminError::Database(format!("Failed to update user: {}", e))
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound(format!("User not found: {}", id)));
    }
    Ok(())
}

/// アカウント停止フラグを設定
pub async fn set_banned(pool: &SqlitePool, id: Uuid, banned: bool) -> Result<(), AdminError> {
    let result = sqlx::query("UPDATE users SET banned = ?, updated_at = ? WHERE id = ?")
        .bind(banned as i32)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| AdminError::Database(format!("Failed to update user: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound(format!("User not found: {}", id)));
    }
    Ok(())
}

/// 検索・フィルター・ソート・ページング付きのユーザー一覧
pub async fn list(pool: &SqlitePool, query: &UserListQuery) -> Result<Vec<User>, AdminError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM users", USER_COLUMNS));
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
        .build_query_as::<UserRow>()
        .fetch_all(pool)
        .await
        .map_err(|e| AdminError::Database(format!("Failed to list users: {}", e)))?;

    Ok(rows.into_iter().map(|r| r.into_user()).collect())
}

/// 一覧クエリと同じ条件での総件数
pub async fn count(pool: &SqlitePool, query: &UserListQuery) -> Result<i64, AdminError> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
    push_conditions(&mut qb, query);

    let total: i64 = qb
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|e| AdminError::Database(format!("Failed to count users: {}", e)))?;

    Ok(total)
}

fn push_conditions(qb: &mut QueryBuilder<'_, Sqlite>, query: &UserListQuery) {
    let mut has_where = false;

    fn and(qb: &mut QueryBuilder<'_, Sqlite>, has_where: &mut bool) {
        if *has_where {
            qb.push(" AND ");
        } else {
            qb.push(" WHERE ");
            *has_where = true;
        }
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        and(qb, &mut has_where);
        let pattern = format!("%{}%", search);
        qb.push("(name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR email LIKE ")
            .push_bind(pattern.clone())
            .push(" OR role LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    for filter in &query.filters {
        and(qb, &mut has_where);
        match filter.column {
            UserColumn::Status => {
                // "Active" は停止されていないユーザー、それ以外は停止中
                if filter.value == "Active" {
                    qb.push("banned = 0");
                } else {
                    qb.push("banned = 1");
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
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    banned: i32,
    password_hash: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn into_user(self) -> User {
        let id = Uuid::parse_str(&self.id).unwrap();
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .unwrap()
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)
            .unwrap()
            .with_timezone(&Utc);

        User {
            id,
            name: self.name,
            email: self.email,
            role: UserRole::from_db(&self.role),
            banned: self.banned != 0,
            password_hash: self.password_hash,
            created_at,
            updated_at,
        }
    }
}
