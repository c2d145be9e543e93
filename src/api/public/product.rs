use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::str::FromStr;
use std::sync::Arc;

use crate::entities::product::{self, Category, Entity as ProductEntity};
use crate::error::ApiError;

//ROUTERS
pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", get(list_products))
        .route("/product/bestsellers", get(list_best_sellers))
        .route("/product/category/:category", get(list_by_category))
        .route("/product/:id", get(get_product))
        .layer(Extension(db))
}

//ROUTES
async fn list_products(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let products = ProductEntity::find()
        .order_by_asc(product::Column::Name)
        .all(&*db)
        .await?;
    Ok(Json(products))
}

async fn list_best_sellers(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let products = ProductEntity::find()
        .filter(product::Column::IsBestSeller.eq(true))
        .order_by_asc(product::Column::Name)
        .all(&*db)
        .await?;
    Ok(Json(products))
}

async fn list_by_category(
    Path(category): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let category = Category::from_str(&category).map_err(ApiError::Validation)?;

    let products = ProductEntity::find()
        .filter(product::Column::Category.eq(category))
        .order_by_asc(product::Column::Name)
        .all(&*db)
        .await?;
    Ok(Json(products))
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let product = ProductEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No product with id {id} was found")))?;
    Ok(Json(product))
}
