use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

use crate::entities::{
    feedback::{self, Entity as FeedbackEntity},
    order::{self, Entity as OrderEntity, Status},
    order_item::{self, Entity as OrderItemEntity},
    product,
};
use crate::error::ApiError;
use crate::middleware::auth::Claims;

//ROUTERS
pub fn feedback_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/feedback", post(submit_feedback))
        .route("/feedback/eligible", get(get_eligible))
        .layer(Extension(db))
}

//ROUTES
async fn submit_feedback(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitFeedback>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;

    let order = OrderEntity::find_by_id(payload.order_id)
        .filter(order::Column::UserId.eq(claims.sub))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No order with id {} was found", payload.order_id))
        })?;

    if order.status != Status::Delivered {
        return Err(ApiError::UnprocessableEntity(
            "Feedback is only accepted for delivered orders".to_string(),
        ));
    }

    let in_order = OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .filter(order_item::Column::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;
    if in_order.is_none() {
        return Err(ApiError::Validation(format!(
            "Product {} was not part of this order",
            payload.product_id
        )));
    }

    let existing = FeedbackEntity::find()
        .filter(feedback::Column::UserId.eq(claims.sub))
        .filter(feedback::Column::OrderId.eq(order.id))
        .filter(feedback::Column::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Feedback for this item was already submitted".to_string(),
        ));
    }

    let record = feedback::ActiveModel {
        user_id: Set(claims.sub),
        order_id: Set(order.id),
        product_id: Set(payload.product_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    FeedbackEntity::insert(record).exec(&txn).await?;

    txn.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Feedback recorded" })),
    ))
}

/// Delivered orders of the caller with the items they have not yet rated.
/// Orders with nothing left to rate are omitted.
async fn get_eligible(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = OrderEntity::find()
        .filter(order::Column::UserId.eq(claims.sub))
        .filter(order::Column::Status.eq(Status::Delivered))
        .all(&*db)
        .await?;

    let order_ids: Vec<i32> = orders.iter().map(|order| order.id).collect();
    let items = OrderItemEntity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .find_also_related(product::Entity)
        .all(&*db)
        .await?;

    let reviewed: HashSet<(i32, i32)> = FeedbackEntity::find()
        .filter(feedback::Column::UserId.eq(claims.sub))
        .all(&*db)
        .await?
        .into_iter()
        .map(|record| (record.order_id, record.product_id))
        .collect();

    let eligible: Vec<EligibleOrderResponse> = orders
        .into_iter()
        .filter_map(|order| {
            let ungraded: Vec<EligibleItemResponse> = items
                .iter()
                .filter(|(item, _)| {
                    item.order_id == order.id && !reviewed.contains(&(order.id, item.product_id))
                })
                .map(|(item, product)| EligibleItemResponse {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    name: product.as_ref().map(|p| p.name.clone()),
                })
                .collect();

            if ungraded.is_empty() {
                None
            } else {
                Some(EligibleOrderResponse {
                    order_id: order.id,
                    items: ungraded,
                })
            }
        })
        .collect();

    Ok(Json(eligible))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct SubmitFeedback {
    order_id: i32,
    product_id: i32,
    #[validate(range(min = 1, max = 5))]
    rating: i32,
    comment: Option<String>,
}

#[derive(Serialize)]
struct EligibleOrderResponse {
    order_id: i32,
    items: Vec<EligibleItemResponse>,
}

#[derive(Serialize)]
struct EligibleItemResponse {
    product_id: i32,
    quantity: i32,
    name: Option<String>,
}
