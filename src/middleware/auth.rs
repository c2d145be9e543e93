use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::entities::user::{self, Entity as UserEntity};
use crate::error::ApiError;

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub is_admin: bool,
    pub exp: usize,
}

#[derive(Clone)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub require_admin: bool,
}

/// Verifies the bearer credential, loads the referenced user and attaches
/// both to the request. Admin-only routers set `require_admin` and get a 403
/// for valid non-admin credentials.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Malformed Authorization header"))?,
        None => return Err(ApiError::Unauthorized("Missing Authorization header")),
    };

    let claims = decode_token(token, &state.config.secret)?;

    let user = UserEntity::find_by_id(claims.sub)
        .one(&*state.db)
        .await?
        .ok_or(ApiError::Unauthorized("Unknown user"))?;

    if state.require_admin && !user.is_admin {
        return Err(ApiError::Forbidden);
    }

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub fn generate_token(user: &user::Model, secret: &str) -> Result<String, ApiError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or_else(|| ApiError::Internal("Token expiry overflowed".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        is_admin: user.is_admin,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ApiError::Internal(format!("Failed to generate token: {err}")))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired credential"))
}
