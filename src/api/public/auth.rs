use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

use crate::config::Config;
use crate::entities::{
    cart_item::{self, Entity as CartItemEntity},
    product::Entity as ProductEntity,
    user::{self, Entity as UserEntity},
    wishlist_item::{self, Entity as WishlistItemEntity},
};
use crate::error::ApiError;
use crate::middleware::auth::generate_token;

//ROUTERS
pub fn auth_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .layer(Extension(db))
        .layer(Extension(config))
}

//ROUTES
async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let password = user::hash_password(&payload.password)
        .map_err(|err| ApiError::Internal(format!("Failed to hash password: {err}")))?;

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        email: Set(payload.email),
        password: Set(password),
        contact: Set(payload.contact),
        is_admin: Set(false),
        ..Default::default()
    };

    let model = match new_user.insert(&*db).await {
        Ok(model) => model,
        Err(_) => {
            return Err(ApiError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }
    };

    let token = generate_token(&model, &config.secret)?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let user = UserEntity::find()
        .filter(user::Column::Email.eq(&*payload.email))
        .one(&*db)
        .await?
        .ok_or(ApiError::Unauthorized("Invalid email or password"))?;

    if !user.verify_password(&payload.password) {
        return Err(ApiError::Unauthorized("Invalid email or password"));
    }

    let token = generate_token(&user, &config.secret)?;

    merge_guest_state(
        &db,
        user.id,
        payload.guest_cart.unwrap_or_default(),
        payload.guest_wishlist.unwrap_or_default(),
    )
    .await?;

    Ok(Json(json!({ "token": token })))
}

/// Folds a guest's locally kept selections into the server-side lists:
/// union by product id, cart quantities summed. Unknown products are
/// skipped rather than failing the login.
async fn merge_guest_state(
    db: &DatabaseConnection,
    user_id: i32,
    guest_cart: Vec<GuestCartItem>,
    guest_wishlist: Vec<i32>,
) -> Result<(), ApiError> {
    if guest_cart.is_empty() && guest_wishlist.is_empty() {
        return Ok(());
    }

    let txn = db.begin().await?;

    for item in guest_cart {
        if item.quantity <= 0 {
            continue;
        }
        if ProductEntity::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .is_none()
        {
            warn!(product_id = item.product_id, "guest cart references unknown product, skipping");
            continue;
        }

        let existing = CartItemEntity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(item.product_id))
            .one(&txn)
            .await?;

        match existing {
            Some(entry) => {
                let merged = entry.quantity + item.quantity;
                let mut entry: cart_item::ActiveModel = entry.into();
                entry.quantity = Set(merged);
                entry.update(&txn).await?;
            }
            None => {
                let entry = cart_item::ActiveModel {
                    user_id: Set(user_id),
                    product_id: Set(item.product_id),
                    quantity: Set(item.quantity),
                    ..Default::default()
                };
                CartItemEntity::insert(entry).exec(&txn).await?;
            }
        }
    }

    for product_id in guest_wishlist {
        if ProductEntity::find_by_id(product_id)
            .one(&txn)
            .await?
            .is_none()
        {
            warn!(product_id, "guest wishlist references unknown product, skipping");
            continue;
        }

        let existing = WishlistItemEntity::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .filter(wishlist_item::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;
        if existing.is_none() {
            let entry = wishlist_item::ActiveModel {
                user_id: Set(user_id),
                product_id: Set(product_id),
                ..Default::default()
            };
            WishlistItemEntity::insert(entry).exec(&txn).await?;
        }
    }

    txn.commit().await?;
    Ok(())
}

//Structs
#[derive(Deserialize, Validate, Clone, Debug)]
struct RegisterPayload {
    #[validate(regex(path = *USERNAME_REGEX))]
    username: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
    #[validate(regex(path = *CONTACT_REGEX))]
    contact: String,
}

#[derive(Deserialize, Validate)]
struct LoginPayload {
    #[validate(email)]
    email: String,
    password: String,
    guest_cart: Option<Vec<GuestCartItem>>,
    guest_wishlist: Option<Vec<i32>>,
}

#[derive(Deserialize)]
struct GuestCartItem {
    product_id: i32,
    quantity: i32,
}

//utils
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,25}$").unwrap());
static CONTACT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").unwrap());
