//! エンドポイントマニフェスト
//!
//! アプリケーション内の全エンドポイントをここに明示的に列挙する。
//! モジュール読み込みの副作用による登録は行わない。起動時に
//! [`super::registry::ApiRegistry::build`] へ渡され、パスの重複は
//! その時点でエラーになる。

use super::endpoint::EndpointDescriptor;
use crate::features::{post, user};

/// 全エンドポイントの記述子を返す
pub fn api_manifest() -> Vec<EndpointDescriptor> {
    vec![
        // ユーザー管理
        user::actions::login_api().descriptor(),
        user::actions::logout_api().descriptor(),
        user::actions::get_current_user_api().descriptor(),
        user::actions::get_user_by_id_api().descriptor(),
        user::actions::get_user_list_api().descriptor(),
        user::actions::get_user_list_count_api().descriptor(),
        user::actions::create_user_api().descriptor(),
        user::actions::update_user_api().descriptor(),
        user::actions::activate_user_api().descriptor(),
        user::actions::deactivate_user_api().descriptor(),
        // 投稿管理
        post::actions::create_post_api().descriptor(),
        post::actions::update_post_api().descriptor(),
        post::actions::delete_post_api().descriptor(),
        post::actions::get_post_by_id_api().descriptor(),
        post::actions::get_post_list_api().descriptor(),
        post::actions::get_post_list_count_api().descriptor(),
    ]
}
