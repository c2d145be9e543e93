use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::entities::{
    order::{self, Entity as OrderEntity, PaymentStatus, Status},
    order_item::{self, Entity as OrderItemEntity},
    product,
};
use crate::error::ApiError;
use crate::middleware::auth::Claims;

//ROUTERS
pub fn order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_own_orders).post(place_order))
        .layer(Extension(db))
}

//ROUTES
async fn place_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PlaceOrder>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }

    // Duplicate product lines collapse into one.
    let mut quantities: BTreeMap<i32, i32> = BTreeMap::new();
    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(ApiError::Validation(
                "Quantity should be greater than 0".to_string(),
            ));
        }
        *quantities.entry(item.product_id).or_insert(0) += item.quantity;
    }

    let txn = db.begin().await?;

    let mut lines = Vec::with_capacity(quantities.len());
    let mut total: f32 = 0.0;
    for (&product_id, &quantity) in &quantities {
        let product = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Validation(format!("No product with id {product_id} was found"))
            })?;
        total += product.price * quantity as f32;
        lines.push((product_id, quantity, product.price));
    }

    // The client may echo its own figure, but the catalog decides.
    if let Some(client_total) = payload.total {
        if (client_total - total).abs() > 0.005 {
            warn!(
                user_id = claims.sub,
                client_total, computed_total = total, "client order total mismatch"
            );
        }
    }

    let new_order = order::ActiveModel {
        user_id: Set(claims.sub),
        total: Set(total),
        status: Set(Status::Placed),
        payment_status: Set(PaymentStatus::Pending),
        gateway_order_id: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let order_id = OrderEntity::insert(new_order).exec(&txn).await?.last_insert_id;

    let items: Vec<order_item::ActiveModel> = lines
        .into_iter()
        .map(|(product_id, quantity, unit_price)| order_item::ActiveModel {
            order_id: Set(order_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
            ..Default::default()
        })
        .collect();
    OrderItemEntity::insert_many(items).exec(&txn).await?;

    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "order_id": order_id, "total": total })),
    ))
}

async fn get_own_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = OrderEntity::find()
        .filter(order::Column::UserId.eq(claims.sub))
        .order_by_desc(order::Column::CreatedAt)
        .all(&*db)
        .await?;

    let order_ids: Vec<i32> = orders.iter().map(|order| order.id).collect();
    let items = OrderItemEntity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .find_also_related(product::Entity)
        .all(&*db)
        .await?;

    let responses: Vec<OrderResponse> = orders
        .into_iter()
        .map(|order| OrderResponse::new(order, &items))
        .collect();

    Ok(Json(responses))
}

//Structs
#[derive(Deserialize, Debug)]
struct PlaceOrder {
    items: Vec<OrderLine>,
    total: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct OrderLine {
    product_id: i32,
    quantity: i32,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i32,
    pub total: f32,
    pub status: Status,
    pub payment_status: PaymentStatus,
    pub created_at: chrono::DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: f32,
    pub name: Option<String>,
}

impl OrderResponse {
    pub fn new(
        order: order::Model,
        items: &[(order_item::Model, Option<product::Model>)],
    ) -> Self {
        let items = items
            .iter()
            .filter(|(item, _)| item.order_id == order.id)
            .map(|(item, product)| OrderItemResponse {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                name: product.as_ref().map(|p| p.name.clone()),
            })
            .collect();

        OrderResponse {
            id: order.id,
            total: order.total,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
            items,
        }
    }
}
