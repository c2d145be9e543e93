use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    feedback::{self, Entity as FeedbackEntity},
    order::Entity as OrderEntity,
    product::Entity as ProductEntity,
    user::Entity as UserEntity,
};
use crate::error::ApiError;

//ROUTERS
pub fn stats_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/feedback", get(get_all_feedback))
        .layer(Extension(db))
}

//ROUTES
async fn get_stats(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = UserEntity::find().count(&*db).await?;
    let products = ProductEntity::find().count(&*db).await?;
    let orders = OrderEntity::find().count(&*db).await?;
    let feedbacks = FeedbackEntity::find().count(&*db).await?;

    Ok(Json(json!({
        "users": users,
        "products": products,
        "orders": orders,
        "feedbacks": feedbacks,
    })))
}

async fn get_all_feedback(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let records = FeedbackEntity::find()
        .order_by_desc(feedback::Column::CreatedAt)
        .all(&*db)
        .await?;
    Ok(Json(records))
}
