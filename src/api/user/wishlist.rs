use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    product,
    wishlist_item::{self, Entity as WishlistItemEntity},
};
use crate::error::ApiError;
use crate::middleware::auth::Claims;

//ROUTERS
pub fn wishlist_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/wishlist", get(get_wishlist).post(add_product))
        .route("/wishlist/:id", axum::routing::delete(remove_entry))
        .layer(Extension(db))
}

//ROUTES
async fn get_wishlist(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = WishlistItemEntity::find()
        .filter(wishlist_item::Column::UserId.eq(claims.sub))
        .find_also_related(product::Entity)
        .all(&*db)
        .await?;

    let wishlist: Vec<WishlistEntryResponse> = entries
        .into_iter()
        .map(|(entry, product)| WishlistEntryResponse::new(entry, product))
        .collect();

    Ok(Json(wishlist))
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddToWishlist>,
) -> Result<impl IntoResponse, ApiError> {
    if product::Entity::find_by_id(payload.product_id)
        .one(&*db)
        .await?
        .is_none()
    {
        return Err(ApiError::Validation(format!(
            "No product with id {} was found",
            payload.product_id
        )));
    }

    let existing = WishlistItemEntity::find()
        .filter(wishlist_item::Column::UserId.eq(claims.sub))
        .filter(wishlist_item::Column::ProductId.eq(payload.product_id))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Ok((
            StatusCode::OK,
            Json(json!({ "message": "Already on wishlist" })),
        ));
    }

    let entry = wishlist_item::ActiveModel {
        user_id: Set(claims.sub),
        product_id: Set(payload.product_id),
        ..Default::default()
    };
    WishlistItemEntity::insert(entry).exec(&*db).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Added to wishlist" })),
    ))
}

async fn remove_entry(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = WishlistItemEntity::find_by_id(id)
        .filter(wishlist_item::Column::UserId.eq(claims.sub))
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No wishlist entry with id {id} was found")))?;

    entry.delete(&*db).await?;
    Ok(Json(json!({ "message": "Entry removed" })))
}

//Structs
#[derive(Deserialize, Debug)]
struct AddToWishlist {
    product_id: i32,
}

#[derive(Serialize)]
struct WishlistEntryResponse {
    id: i32,
    product_id: i32,
    name: Option<String>,
    price: Option<f32>,
    image_id: Option<i32>,
}

impl WishlistEntryResponse {
    fn new(entry: wishlist_item::Model, product: Option<product::Model>) -> Self {
        let (name, price, image_id) = match product {
            Some(product) => (Some(product.name), Some(product.price), Some(product.image_id)),
            None => (None, None, None),
        };
        WishlistEntryResponse {
            id: entry.id,
            product_id: entry.product_id,
            name,
            price,
            image_id,
        }
    }
}
