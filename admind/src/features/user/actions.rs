//! ユーザー管理の業務関数とエンドポイント定義

use crate::auth::jwt::create_jwt;
use crate::auth::password::{hash_password, verify_password};
use crate::common::auth::{User, UserRole};
use crate::common::error::AdminError;
use crate::db;
use crate::db::users::{UserColumn, UserColumnFilter, UserListQuery};
use crate::features::table::{list_schema, ListCount, ListParams};
use crate::features::{ActionMessage, NoParams};
use crate::server_api::endpoint::{Access, ServerApi};
use crate::server_api::schema::{FieldKind, InputSchema};
use crate::server_api::context::ApiContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ADMIN_ONLY: Access = Access::Roles(&[UserRole::Admin]);

/// 一覧で参照できるカラムID
const USER_COLUMN_IDS: &[&str] = &["name", "email", "role", "status"];

/// クライアントへ返すユーザー表現（パスワードハッシュを含まない）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// ユーザーID
    pub id: Uuid,
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: UserRole,
    /// アカウント停止フラグ
    pub banned: bool,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            banned: user.banned,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// ログイン入力
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginParams {
    /// メールアドレス
    pub email: String,
    /// パスワード
    pub password: String,
}

/// ログイン応答
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// セッショントークン（JWT）
    pub token: String,
    /// ログインしたユーザー
    pub user: UserView,
}

/// ID指定の入力
#[derive(Debug, Serialize, Deserialize)]
pub struct UserIdParams {
    /// 対象ユーザーID
    pub id: Uuid,
}

/// ユーザー作成入力
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserParams {
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: UserRole,
    /// パスワード
    pub password: String,
    /// パスワード（確認）
    pub password_confirmation: String,
}

/// ユーザー更新入力
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserParams {
    /// 対象ユーザーID
    pub id: Uuid,
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: UserRole,
    /// 新しいパスワード（省略時は変更しない）
    pub password: Option<String>,
}

/// メールアドレスとパスワードでログインする
///
/// 資格情報の不一致は存在有無を漏らさないよう同一メッセージで返す。
pub async fn login(ctx: ApiContext, params: LoginParams) -> Result<LoginResponse, AdminError> {
    let invalid = || AdminError::Authentication("Invalid email or password".to_string());

    let user = db::users::find_by_email(&ctx.db, &params.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&params.password, &user.password_hash)? {
        return Err(invalid());
    }
    if user.banned {
        return Err(AdminError::Authentication("Account is banned".to_string()));
    }

    let token = create_jwt(user.id, user.role, &ctx.jwt_secret)?;
    tracing::info!(user_id = %user.id, "user signed in");

    Ok(LoginResponse {
        token,
        user: user.into(),
    })
}

/// ログアウトする
///
/// JWTはステートレスなのでサーバー側の無効化は行わない。クライアント
/// 対称性と監査ログのために存在する。
pub async fn logout(ctx: ApiContext, _params: NoParams) -> Result<ActionMessage, AdminError> {
    let session = ctx.require_session()?;
    tracing::info!(user_id = %session.user_id, "user signed out");
    Ok(ActionMessage::new("Signed out successfully"))
}

/// 現在のセッションのユーザーを返す
pub async fn get_current_user(ctx: ApiContext, _params: NoParams) -> Result<UserView, AdminError> {
    let session = ctx.require_session()?;
    let user = db::users::find_active_by_id(&ctx.db, session.user_id)
        .await?
        .ok_or_else(|| AdminError::Authentication("Session user no longer exists".to_string()))?;
    Ok(user.into())
}

/// IDでユーザーを取得する（停止中ユーザーは存在しない扱い）
pub async fn get_user_by_id(ctx: ApiContext, params: UserIdParams) -> Result<UserView, AdminError> {
    let user = db::users::find_active_by_id(&ctx.db, params.id)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("User not found: {}", params.id)))?;
    Ok(user.into())
}

fn user_list_query(params: &ListParams) -> UserListQuery {
    let filters = params
        .column_filters
        .iter()
        .filter_map(|f| {
            UserColumn::parse(&f.id).map(|column| UserColumnFilter {
                column,
                value: f.value.clone(),
            })
        })
        .collect();
    let sort = params
        .sorting
        .first()
        .and_then(|s| UserColumn::parse(&s.id).map(|column| (column, s.desc)));

    UserListQuery {
        search: params.search.clone(),
        filters,
        sort,
        limit: params.limit(),
        offset: params.offset(),
    }
}

/// ユーザー一覧を取得する
pub async fn get_user_list(
    ctx: ApiContext,
    params: ListParams,
) -> Result<Vec<UserView>, AdminError> {
    let users = db::users::list(&ctx.db, &user_list_query(&params)).await?;
    Ok(users.into_iter().map(UserView::from).collect())
}

/// ユーザー一覧と同条件の総件数を取得する
pub async fn get_user_list_count(
    ctx: ApiContext,
    params: ListParams,
) -> Result<ListCount, AdminError> {
    let count = db::users::count(&ctx.db, &user_list_query(&params)).await?;
    Ok(ListCount { count })
}

/// ユーザーを作成する
pub async fn create_user(
    ctx: ApiContext,
    params: CreateUserParams,
) -> Result<ActionMessage, AdminError> {
    let password_hash = hash_password(&params.password)?;
    let user = db::users::create(
        &ctx.db,
        &params.name,
        &params.email,
        &password_hash,
        params.role,
    )
    .await?;
    tracing::info!(user_id = %user.id, "user created");
    Ok(ActionMessage::new("User created successfully"))
}

/// ユーザーを更新する（パスワードは指定時のみ変更）
pub async fn update_user(
    ctx: ApiContext,
    params: UpdateUserParams,
) -> Result<ActionMessage, AdminError> {
    let password_hash = match params.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    db::users::update(
        &ctx.db,
        params.id,
        &params.name,
        &params.email,
        params.role,
        password_hash.as_deref(),
    )
    .await?;
    tracing::info!(user_id = %params.id, "user updated");
    Ok(ActionMessage::new("User updated successfully"))
}

/// アカウント停止を解除する
pub async fn activate_user(
    ctx: ApiContext,
    params: UserIdParams,
) -> Result<ActionMessage, AdminError> {
    db::users::set_banned(&ctx.db, params.id, false).await?;
    tracing::info!(user_id = %params.id, "user activated");
    Ok(ActionMessage::new("User activated successfully"))
}

/// アカウントを停止する。自分自身の停止は拒否する。
pub async fn deactivate_user(
    ctx: ApiContext,
    params: UserIdParams,
) -> Result<ActionMessage, AdminError> {
    let session = ctx.require_session()?;
    if session.user_id == params.id {
        return Err(AdminError::Authorization(
            "Cannot deactivate your own account".to_string(),
        ));
    }
    db::users::set_banned(&ctx.db, params.id, true).await?;
    tracing::info!(user_id = %params.id, "user deactivated");
    Ok(ActionMessage::new("User deactivated successfully"))
}

/// ログインエンドポイント
pub fn login_api() -> ServerApi<LoginParams, LoginResponse> {
    ServerApi::new("/user/login", login).with_schema(
        InputSchema::new()
            .required("email", FieldKind::email())
            .required("password", FieldKind::string_len(6, None)),
    )
}

/// ログアウトエンドポイント
pub fn logout_api() -> ServerApi<NoParams, ActionMessage> {
    ServerApi::new("/user/logout", logout).with_access(Access::Authenticated)
}

/// 現在ユーザー取得エンドポイント
pub fn get_current_user_api() -> ServerApi<NoParams, UserView> {
    ServerApi::new("/user/current", get_current_user).with_access(Access::Authenticated)
}

/// ユーザー取得エンドポイント
pub fn get_user_by_id_api() -> ServerApi<UserIdParams, UserView> {
    ServerApi::new("/user/get", get_user_by_id)
        .with_schema(InputSchema::new().required("id", FieldKind::uuid()))
        .with_access(Access::Authenticated)
}

/// ユーザー一覧エンドポイント
pub fn get_user_list_api() -> ServerApi<ListParams, Vec<UserView>> {
    ServerApi::new("/user/list", get_user_list)
        .with_schema(list_schema(USER_COLUMN_IDS))
        .with_access(ADMIN_ONLY)
}

/// ユーザー件数エンドポイント
pub fn get_user_list_count_api() -> ServerApi<ListParams, ListCount> {
    ServerApi::new("/user/count", get_user_list_count)
        .with_schema(list_schema(USER_COLUMN_IDS))
        .with_access(ADMIN_ONLY)
}

/// ユーザー作成エンドポイント
pub fn create_user_api() -> ServerApi<CreateUserParams, ActionMessage> {
    ServerApi::new("/user/create", create_user)
        .with_schema(
            InputSchema::new()
                .required("name", FieldKind::string_len(1, Some(100)))
                .required("email", FieldKind::email())
                .required("role", FieldKind::enum_of(&["admin", "user"]))
                .required("password", FieldKind::string_len(6, Some(30)))
                .required("passwordConfirmation", FieldKind::string_len(6, Some(30)))
                .equals(
                    "password",
                    "passwordConfirmation",
                    "passwordConfirmation",
                    "Password confirmation must be same as password",
                ),
        )
        .with_access(ADMIN_ONLY)
}

/// ユーザー更新エンドポイント
pub fn update_user_api() -> ServerApi<UpdateUserParams, ActionMessage> {
    ServerApi::new("/user/update", update_user)
        .with_schema(
            InputSchema::new()
                .required("id", FieldKind::uuid())
                .required("name", FieldKind::string_len(1, Some(100)))
                .required("email", FieldKind::email())
                .required("role", FieldKind::enum_of(&["admin", "user"]))
                .optional("password", FieldKind::string_len(6, Some(30))),
        )
        .with_access(ADMIN_ONLY)
}

/// アカウント停止解除エンドポイント
pub fn activate_user_api() -> ServerApi<UserIdParams, ActionMessage> {
    ServerApi::new("/user/activate", activate_user)
        .with_schema(InputSchema::new().required("id", FieldKind::uuid()))
        .with_access(ADMIN_ONLY)
}

/// アカウント停止エンドポイント
pub fn deactivate_user_api() -> ServerApi<UserIdParams, ActionMessage> {
    ServerApi::new("/user/deactivate", deactivate_user)
        .with_schema(InputSchema::new().required("id", FieldKind::uuid()))
        .with_access(ADMIN_ONLY)
}
