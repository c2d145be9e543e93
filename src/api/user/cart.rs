use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    cart_item::{self, Entity as CartItemEntity},
    product,
};
use crate::error::ApiError;
use crate::middleware::auth::Claims;

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_product))
        .route("/cart/:id", patch(patch_entry).delete(remove_entry))
        .layer(Extension(db))
}

//ROUTES
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = CartItemEntity::find()
        .filter(cart_item::Column::UserId.eq(claims.sub))
        .find_also_related(product::Entity)
        .all(&*db)
        .await?;

    let cart: Vec<CartEntryResponse> = entries
        .into_iter()
        .map(|(entry, product)| CartEntryResponse::new(entry, product))
        .collect();

    Ok(Json(cart))
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddProduct>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.quantity <= 0 {
        return Err(ApiError::Validation(
            "Quantity should be greater than 0".to_string(),
        ));
    }

    let txn = db.begin().await?;

    if product::Entity::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(ApiError::Validation(format!(
            "No product with id {} was found",
            payload.product_id
        )));
    }

    let existing = CartItemEntity::find()
        .filter(cart_item::Column::UserId.eq(claims.sub))
        .filter(cart_item::Column::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;

    // Same product twice grows the line, never duplicates it.
    let (status, message) = match existing {
        Some(entry) => {
            let merged = entry.quantity + payload.quantity;
            let mut entry: cart_item::ActiveModel = entry.into();
            entry.quantity = Set(merged);
            entry.update(&txn).await?;
            (StatusCode::OK, "Quantity updated")
        }
        None => {
            let entry = cart_item::ActiveModel {
                user_id: Set(claims.sub),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                ..Default::default()
            };
            CartItemEntity::insert(entry).exec(&txn).await?;
            (StatusCode::CREATED, "Added to cart")
        }
    };

    txn.commit().await?;
    Ok((status, Json(json!({ "message": message }))))
}

async fn patch_entry(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchCartEntry>,
) -> Result<impl IntoResponse, ApiError> {
    let txn = db.begin().await?;

    let entry = CartItemEntity::find_by_id(id)
        .filter(cart_item::Column::UserId.eq(claims.sub))
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No cart entry with id {id} was found")))?;

    // Zero or below means the line goes away.
    if payload.quantity <= 0 {
        entry.delete(&txn).await?;
        txn.commit().await?;
        return Ok(Json(json!({ "message": "Entry removed" })));
    }

    let mut entry: cart_item::ActiveModel = entry.into();
    entry.quantity = Set(payload.quantity);
    entry.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(json!({ "message": "Entry updated" })))
}

async fn remove_entry(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = CartItemEntity::find_by_id(id)
        .filter(cart_item::Column::UserId.eq(claims.sub))
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No cart entry with id {id} was found")))?;

    entry.delete(&*db).await?;
    Ok(Json(json!({ "message": "Entry removed" })))
}

//Structs
#[derive(Deserialize, Debug)]
struct AddProduct {
    product_id: i32,
    quantity: i32,
}

#[derive(Deserialize)]
struct PatchCartEntry {
    quantity: i32,
}

#[derive(Serialize)]
struct CartEntryResponse {
    id: i32,
    product_id: i32,
    quantity: i32,
    name: Option<String>,
    price: Option<f32>,
    image_id: Option<i32>,
}

impl CartEntryResponse {
    fn new(entry: cart_item::Model, product: Option<product::Model>) -> Self {
        let (name, price, image_id) = match product {
            Some(product) => (Some(product.name), Some(product.price), Some(product.image_id)),
            None => (None, None, None),
        };
        CartEntryResponse {
            id: entry.id,
            product_id: entry.product_id,
            quantity: entry.quantity,
            name,
            price,
            image_id,
        }
    }
}
