use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use crate::entities::{
    order::{self, Entity as OrderEntity, PaymentStatus, Status},
    order_item::{self, Entity as OrderItemEntity},
    product, user,
};
use crate::error::ApiError;

//ROUTERS
pub fn admin_order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_all_orders))
        .route("/order/status/:status", get(get_orders_by_status))
        .route("/order/:id/status", patch(update_status))
        .route("/sales/today", get(get_sales_today))
        .layer(Extension(db))
}

//ROUTES
async fn get_all_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = OrderEntity::find()
        .find_also_related(user::Entity)
        .order_by_desc(order::Column::CreatedAt)
        .all(&*db)
        .await?;

    Ok(Json(expand_orders(&db, orders).await?))
}

async fn get_orders_by_status(
    Path(status): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let status = Status::from_str(&status).map_err(ApiError::Validation)?;

    let orders = OrderEntity::find()
        .filter(order::Column::Status.eq(status))
        .find_also_related(user::Entity)
        .order_by_desc(order::Column::CreatedAt)
        .all(&*db)
        .await?;

    Ok(Json(expand_orders(&db, orders).await?))
}

async fn update_status(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateStatus>,
) -> Result<impl IntoResponse, ApiError> {
    let txn = db.begin().await?;

    let order = OrderEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No order with id {id} was found")))?;

    if !order.status.can_step_to(payload.status) {
        return Err(ApiError::UnprocessableEntity(format!(
            "Cannot move order from {} to {}",
            order.status.as_str(),
            payload.status.as_str()
        )));
    }

    let mut order: order::ActiveModel = order.into();
    order.status = Set(payload.status);
    order.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(json!({ "message": "Status updated" })))
}

async fn get_sales_today(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let (start, end) = local_day_bounds(Local::now());

    let orders = OrderEntity::find()
        .filter(order::Column::CreatedAt.gte(start))
        .filter(order::Column::CreatedAt.lt(end))
        .order_by_desc(order::Column::CreatedAt)
        .all(&*db)
        .await?;

    let total_sales: f32 = orders.iter().map(|order| order.total).sum();

    Ok(Json(json!({ "total_sales": total_sales, "orders": orders })))
}

//utils
async fn expand_orders(
    db: &DatabaseConnection,
    orders: Vec<(order::Model, Option<user::Model>)>,
) -> Result<Vec<AdminOrderResponse>, ApiError> {
    let order_ids: Vec<i32> = orders.iter().map(|(order, _)| order.id).collect();
    let items = OrderItemEntity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .find_also_related(product::Entity)
        .all(db)
        .await?;

    Ok(orders
        .into_iter()
        .map(|(order, user)| AdminOrderResponse::new(order, user, &items))
        .collect())
}

/// [00:00:00, 24:00:00) of the current local calendar day, in UTC.
fn local_day_bounds(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_naive = now.date_naive().and_time(NaiveTime::MIN);
    let start = Local
        .from_local_datetime(&start_naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&start_naive));
    (start, start + Duration::days(1))
}

//Structs
#[derive(Deserialize, Debug)]
struct UpdateStatus {
    status: Status,
}

#[derive(Serialize)]
struct AdminOrderResponse {
    id: i32,
    user: Option<AdminOrderUser>,
    total: f32,
    status: Status,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
    items: Vec<AdminOrderItem>,
}

#[derive(Serialize)]
struct AdminOrderUser {
    id: i32,
    username: String,
    email: String,
}

#[derive(Serialize)]
struct AdminOrderItem {
    product_id: i32,
    quantity: i32,
    unit_price: f32,
    name: Option<String>,
}

impl AdminOrderResponse {
    fn new(
        order: order::Model,
        user: Option<user::Model>,
        items: &[(order_item::Model, Option<product::Model>)],
    ) -> Self {
        let items = items
            .iter()
            .filter(|(item, _)| item.order_id == order.id)
            .map(|(item, product)| AdminOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                name: product.as_ref().map(|p| p.name.clone()),
            })
            .collect();

        AdminOrderResponse {
            id: order.id,
            user: user.map(|user| AdminOrderUser {
                id: user.id,
                username: user.username,
                email: user.email,
            }),
            total: order.total,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
            items,
        }
    }
}
