use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::{
    address::{self, Entity as AddressEntity},
    user,
};
use crate::error::ApiError;
use crate::middleware::auth::Claims;

//ROUTERS
pub fn profile_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/profile", get(get_profile).patch(patch_profile))
        .route("/profile/address", post(add_address))
        .route("/profile/address/:id", axum::routing::delete(remove_address))
        .layer(Extension(db))
}

//ROUTES
async fn get_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<user::Model>,
) -> Result<impl IntoResponse, ApiError> {
    let addresses = AddressEntity::find()
        .filter(address::Column::UserId.eq(user.id))
        .all(&*db)
        .await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        contact: user.contact,
        is_admin: user.is_admin,
        addresses,
    }))
}

async fn patch_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<user::Model>,
    Json(payload): Json<PatchProfile>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let mut active: user::ActiveModel = user.into();

    if let Some(username) = payload.username {
        active.username = Set(username);
    }

    if let Some(contact) = payload.contact {
        active.contact = Set(contact);
    }

    if let Some(password) = payload.password {
        let password = user::hash_password(&password)
            .map_err(|err| ApiError::Internal(format!("Failed to hash password: {err}")))?;
        active.password = Set(password);
    }

    match active.update(&*db).await {
        Ok(_) => Ok(Json(json!({ "message": "Profile updated" }))),
        Err(_) => Err(ApiError::Conflict("Username already taken".to_string())),
    }
}

async fn add_address(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddAddress>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let entry = address::ActiveModel {
        user_id: Set(claims.sub),
        label: Set(payload.label),
        line: Set(payload.line),
        city: Set(payload.city),
        postal_code: Set(payload.postal_code),
        ..Default::default()
    };
    let result = AddressEntity::insert(entry).exec(&*db).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": result.last_insert_id, "message": "Address saved" })),
    ))
}

async fn remove_address(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = AddressEntity::find_by_id(id)
        .filter(address::Column::UserId.eq(claims.sub))
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No address with id {id} was found")))?;

    entry.delete(&*db).await?;
    Ok(Json(json!({ "message": "Address removed" })))
}

//Structs
#[derive(Serialize)]
struct ProfileResponse {
    id: i32,
    username: String,
    email: String,
    contact: String,
    is_admin: bool,
    addresses: Vec<address::Model>,
}

#[derive(Deserialize, Validate)]
struct PatchProfile {
    #[validate(regex(path = *USERNAME_REGEX))]
    username: Option<String>,
    #[validate(regex(path = *CONTACT_REGEX))]
    contact: Option<String>,
    #[validate(length(min = 8))]
    password: Option<String>,
}

#[derive(Deserialize, Validate)]
struct AddAddress {
    #[validate(length(min = 1, max = 50))]
    label: String,
    #[validate(length(min = 1, max = 200))]
    line: String,
    #[validate(length(min = 1, max = 100))]
    city: String,
    #[validate(length(min = 3, max = 12))]
    postal_code: String,
}

//utils
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,25}$").unwrap());
static CONTACT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").unwrap());
