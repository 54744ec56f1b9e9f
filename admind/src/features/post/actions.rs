//! 投稿管理の業務関数とエンドポイント定義

use crate::common::error::AdminError;
use crate::db;
use crate::db::posts::{Post, PostColumn, PostColumnFilter, PostListQuery};
use crate::features::table::{list_schema, ListCount, ListParams};
use crate::features::ActionMessage;
use crate::server_api::context::ApiContext;
use crate::server_api::endpoint::{Access, ServerApi};
use crate::server_api::schema::{FieldKind, InputSchema};
use crate::storage::ObjectStorage;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// 一覧で参照できるカラムID
const POST_COLUMN_IDS: &[&str] = &["title", "content", "isProtected"];

/// クライアントへ返す投稿表現（画像はキーではなくURLで返す）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    /// 投稿ID
    pub id: Uuid,
    /// タイトル
    pub title: String,
    /// 本文
    pub content: String,
    /// 保護フラグ
    pub is_protected: bool,
    /// 添付画像の公開URL
    pub image_url: Option<String>,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

fn to_view(post: Post, storage: &dyn ObjectStorage) -> PostView {
    PostView {
        id: post.id,
        title: post.title,
        content: post.content,
        is_protected: post.is_protected,
        image_url: post.image.as_deref().map(|key| storage.file_url(key)),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// 投稿作成入力
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostParams {
    /// タイトル
    pub title: String,
    /// 本文
    pub content: String,
    /// 保護フラグ（省略時は公開）
    #[serde(default)]
    pub is_protected: bool,
    /// 添付画像（base64）
    pub image: Option<String>,
    /// 添付画像のファイル名（拡張子と種別判定に使用）
    pub image_filename: Option<String>,
}

/// 投稿更新入力
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostParams {
    /// 対象投稿ID
    pub id: Uuid,
    /// タイトル
    pub title: String,
    /// 本文
    pub content: String,
    /// 保護フラグ
    #[serde(default)]
    pub is_protected: bool,
}

/// ID指定の入力
#[derive(Debug, Serialize, Deserialize)]
pub struct PostIdParams {
    /// 対象投稿ID
    pub id: Uuid,
}

/// base64画像をデコードしてストレージへ保存し、キーを返す
async fn store_image(
    ctx: &ApiContext,
    post_id: Uuid,
    data: &str,
    filename: Option<&str>,
) -> Result<String, AdminError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| AdminError::Storage(format!("Failed to process image: {}", e)))?;

    let extension = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();

    if let Some(name) = filename {
        let mime = mime_guess::from_path(name).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(AdminError::Storage(format!(
                "Failed to process image: unsupported file type '{}'",
                mime
            )));
        }
    }

    let key = format!("post/{}{}", post_id, extension);
    ctx.storage.put(&key, &bytes).await?;
    Ok(key)
}

/// 投稿を作成する
pub async fn create_post(ctx: ApiContext, params: CreatePostParams) -> Result<PostView, AdminError> {
    let id = Uuid::new_v4();
    let image_key = match params.image.as_deref() {
        Some(data) => Some(store_image(&ctx, id, data, params.image_filename.as_deref()).await?),
        None => None,
    };

    let post = db::posts::create(
        &ctx.db,
        id,
        &params.title,
        &params.content,
        params.is_protected,
        image_key.as_deref(),
    )
    .await?;
    tracing::info!(post_id = %post.id, "post created");
    Ok(to_view(post, ctx.storage.as_ref()))
}

/// 投稿を更新する（画像は差し替え対象外）
pub async fn update_post(ctx: ApiContext, params: UpdatePostParams) -> Result<PostView, AdminError> {
    db::posts::update(
        &ctx.db,
        params.id,
        &params.title,
        &params.content,
        params.is_protected,
    )
    .await?;
    let post = db::posts::find_by_id(&ctx.db, params.id)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("Post not found: {}", params.id)))?;
    tracing::info!(post_id = %post.id, "post updated");
    Ok(to_view(post, ctx.storage.as_ref()))
}

/// 投稿を削除する。画像オブジェクトの削除はベストエフォート。
pub async fn delete_post(ctx: ApiContext, params: PostIdParams) -> Result<ActionMessage, AdminError> {
    let post = db::posts::find_by_id(&ctx.db, params.id)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("Post not found: {}", params.id)))?;

    if let Some(key) = post.image.as_deref() {
        if let Err(e) = ctx.storage.delete(key).await {
            tracing::warn!(post_id = %post.id, key, error = %e, "failed to delete post image");
        }
    }

    db::posts::delete(&ctx.db, params.id).await?;
    tracing::info!(post_id = %params.id, "post deleted");
    Ok(ActionMessage::new("Post deleted successfully"))
}

/// IDで投稿を取得する。保護投稿は認証済みセッションが必要。
pub async fn get_post_by_id(ctx: ApiContext, params: PostIdParams) -> Result<PostView, AdminError> {
    let post = db::posts::find_by_id(&ctx.db, params.id)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("Post not found: {}", params.id)))?;

    if post.is_protected {
        ctx.require_session()?;
    }
    Ok(to_view(post, ctx.storage.as_ref()))
}

fn post_list_query(params: &ListParams, only_public: bool) -> PostListQuery {
    let filters = params
        .column_filters
        .iter()
        .filter_map(|f| {
            PostColumn::parse(&f.id).map(|column| PostColumnFilter {
                column,
                value: f.value.clone(),
            })
        })
        .collect();
    let sort = params
        .sorting
        .first()
        .and_then(|s| PostColumn::parse(&s.id).map(|column| (column, s.desc)));

    PostListQuery {
        search: params.search.clone(),
        filters,
        sort,
        only_public,
        limit: params.limit(),
        offset: params.offset(),
    }
}

/// 投稿一覧を取得する。未認証の呼び出しでは保護投稿を隠す。
pub async fn get_post_list(ctx: ApiContext, params: ListParams) -> Result<Vec<PostView>, AdminError> {
    let query = post_list_query(&params, ctx.session.is_none());
    let posts = db::posts::list(&ctx.db, &query).await?;
    Ok(posts
        .into_iter()
        .map(|post| to_view(post, ctx.storage.as_ref()))
        .collect())
}

/// 投稿一覧と同条件の総件数を取得する
pub async fn get_post_list_count(
    ctx: ApiContext,
    params: ListParams,
) -> Result<ListCount, AdminError> {
    let query = post_list_query(&params, ctx.session.is_none());
    let count = db::posts::count(&ctx.db, &query).await?;
    Ok(ListCount { count })
}

fn post_body_schema() -> InputSchema {
    InputSchema::new()
        .required("title", FieldKind::string_len(1, Some(100)))
        .required("content", FieldKind::string_len(1, Some(1000)))
        .optional("isProtected", FieldKind::boolean())
}

/// 投稿作成エンドポイント
pub fn create_post_api() -> ServerApi<CreatePostParams, PostView> {
    ServerApi::new("/post/create", create_post)
        .with_schema(
            post_body_schema()
                .optional("image", FieldKind::string())
                .optional("imageFilename", FieldKind::string()),
        )
        .with_access(Access::Authenticated)
}

/// 投稿更新エンドポイント
pub fn update_post_api() -> ServerApi<UpdatePostParams, PostView> {
    ServerApi::new("/post/update", update_post)
        .with_schema(post_body_schema().required("id", FieldKind::uuid()))
        .with_access(Access::Authenticated)
}

/// 投稿削除エンドポイント
pub fn delete_post_api() -> ServerApi<PostIdParams, ActionMessage> {
    ServerApi::new("/post/delete", delete_post)
        .with_schema(InputSchema::new().required("id", FieldKind::uuid()))
        .with_access(Access::Authenticated)
}

/// 投稿取得エンドポイント
pub fn get_post_by_id_api() -> ServerApi<PostIdParams, PostView> {
    ServerApi::new("/post/get", get_post_by_id)
        .with_schema(InputSchema::new().required("id", FieldKind::uuid()))
}

/// 投稿一覧エンドポイント
pub fn get_post_list_api() -> ServerApi<ListParams, Vec<PostView>> {
    ServerApi::new("/post/list", get_post_list).with_schema(list_schema(POST_COLUMN_IDS))
}

/// 投稿件数エンドポイント
pub fn get_post_list_count_api() -> ServerApi<ListParams, ListCount> {
    ServerApi::new("/post/count", get_post_list_count).with_schema(list_schema(POST_COLUMN_IDS))
}
