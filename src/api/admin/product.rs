use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::{
    image,
    product::{self, Category, Entity as ProductEntity},
};
use crate::error::ApiError;

//ROUTERS
pub fn admin_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", post(create_product))
        .route(
            "/product/:id",
            axum::routing::patch(patch_product).delete(delete_product),
        )
        .layer(Extension(db))
}

//ROUTES
async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;

    if image::Entity::find_by_id(payload.image_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "No image with id {} was found",
            payload.image_id
        )));
    }

    let new_product = product::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        category: Set(payload.category),
        price: Set(payload.price),
        image_id: Set(payload.image_id),
        is_best_seller: Set(payload.is_best_seller.unwrap_or_default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = match ProductEntity::insert(new_product).exec(&txn).await {
        Ok(result) => result,
        Err(_) => {
            let _ = txn.rollback().await;
            return Err(ApiError::Conflict("Product already exists".to_string()));
        }
    };
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": result.last_insert_id, "message": "Product created successfully" })),
    ))
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;

    let product = ProductEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No product with id {id} was found")))?;
    let mut product: product::ActiveModel = product.into();

    if let Some(name) = payload.name {
        product.name = Set(name);
    }

    if let Some(description) = payload.description {
        product.description = Set(description);
    }

    if let Some(category) = payload.category {
        product.category = Set(category);
    }

    if let Some(price) = payload.price {
        product.price = Set(price);
    }

    if let Some(image_id) = payload.image_id {
        if image::Entity::find_by_id(image_id).one(&txn).await?.is_none() {
            return Err(ApiError::NotFound(format!(
                "No image with id {image_id} was found"
            )));
        }
        product.image_id = Set(image_id);
    }

    if let Some(is_best_seller) = payload.is_best_seller {
        product.is_best_seller = Set(is_best_seller);
    }

    match product.update(&txn).await {
        Ok(_) => {
            txn.commit().await?;
            Ok(Json(json!({ "message": "Resource patched successfully" })))
        }
        Err(_) => {
            let _ = txn.rollback().await;
            Err(ApiError::Conflict("Product name already taken".to_string()))
        }
    }
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let product = ProductEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No product with id {id} was found")))?;

    product.delete(&*db).await?;
    Ok(Json(json!({ "message": "Resource deleted successfully" })))
}

//Structs
#[derive(Deserialize, Validate, Clone, Debug)]
struct CreateProduct {
    #[validate(length(min = 1, max = 100))]
    name: String,
    description: String,
    category: Category,
    #[validate(range(min = 0.0))]
    price: f32,
    image_id: i32,
    is_best_seller: Option<bool>,
}

#[derive(Deserialize, Validate)]
struct PatchProduct {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    description: Option<String>,
    category: Option<Category>,
    #[validate(range(min = 0.0))]
    price: Option<f32>,
    image_id: Option<i32>,
    is_best_seller: Option<bool>,
}
