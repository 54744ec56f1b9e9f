//! リクエストヘッダーからのセッション復元
//!
//! `Authorization: Bearer <jwt>` またはセッションクッキーから
//! JWTを取り出し、検証できればセッションを返す。無効・欠落は
//! 単に「セッションなし」であり、エラーにはしない（認証を要求
//! するかどうかはエンドポイントのアクセスゲートが決める）。

use crate::auth::jwt::{session_from_claims, verify_jwt};
use crate::auth::SESSION_COOKIE;
use crate::common::auth::Session;
use axum::http::{header, HeaderMap};

/// ヘッダーからセッションを復元する
pub fn extract_session(headers: &HeaderMap, jwt_secret: &str) -> Option<Session> {
    let token = extract_bearer_token(headers).or_else(|| extract_session_cookie(headers))?;
    let claims = verify_jwt(&token, jwt_secret).ok()?;
    session_from_claims(&claims).ok()
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let trimmed = part.trim();
        if let Some(value) = trimmed.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
