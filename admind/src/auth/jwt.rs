//! JWT生成と検証（jsonwebtoken実装）

use crate::common::auth::{Claims, Session, UserRole};
use crate::common::error::AdminError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// JWT有効期限（24時間）
pub const JWT_EXPIRATION_HOURS: i64 = 24;

/// JWTトークンを生成
pub fn create_jwt(user_id: Uuid, role: UserRole, secret: &str) -> Result<String, AdminError> {
    let expiration = Utc::now()
        .checked_add_signed(chrono::Duration::hours(JWT_EXPIRATION_HOURS))
        .ok_or_else(|| AdminError::Jwt("Failed to calculate expiration time".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AdminError::Jwt(format!("Failed to create JWT: {}", e)))
}

/// JWTトークンを検証
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AdminError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AdminError::Jwt(format!("Failed to verify JWT: {}", e)))
}

/// 検証済みクレームからセッションを作る
pub fn session_from_claims(claims: &Claims) -> Result<Session, AdminError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|e| AdminError::Jwt(format!("Invalid subject in JWT: {}", e)))?;
    Ok(Session {
        user_id,
        role: claims.role,
    })
}
