use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::entities::order::{self, Entity as OrderEntity, PaymentStatus};
use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::payment::{gateway::GatewayClient, signature};

//ROUTERS
pub fn payment_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/payment/order", post(create_gateway_order))
        .route("/payment/verify", post(verify_payment))
        .layer(Extension(db))
        .layer(Extension(config))
}

//ROUTES
async fn create_gateway_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateGatewayOrder>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderEntity::find_by_id(payload.order_id)
        .filter(order::Column::UserId.eq(claims.sub))
        .one(&*db)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No order with id {} was found", payload.order_id))
        })?;

    if order.payment_status == PaymentStatus::Paid {
        return Err(ApiError::Conflict("Order is already paid".to_string()));
    }

    let client = GatewayClient::new(&config);
    let gateway_order = client.create_order(order.total).await?;

    let mut order: order::ActiveModel = order.into();
    order.gateway_order_id = Set(Some(gateway_order.id.clone()));
    order.update(&*db).await?;

    Ok(Json(json!({
        "gateway_order_id": gateway_order.id,
        "amount": gateway_order.amount,
        "currency": gateway_order.currency,
    })))
}

async fn verify_payment(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<VerifyPayment>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderEntity::find_by_id(payload.order_id)
        .filter(order::Column::UserId.eq(claims.sub))
        .one(&*db)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No order with id {} was found", payload.order_id))
        })?;

    if order.gateway_order_id.as_deref() != Some(payload.gateway_order_id.as_str()) {
        return Err(ApiError::Validation(
            "Gateway order does not match this order".to_string(),
        ));
    }

    if order.payment_status == PaymentStatus::Paid {
        return Err(ApiError::Conflict("Order is already paid".to_string()));
    }

    if !signature::verify(
        &config.gateway_key_secret,
        &payload.gateway_order_id,
        &payload.payment_id,
        &payload.signature,
    ) {
        return Err(ApiError::Validation(
            "Payment signature verification failed".to_string(),
        ));
    }

    let order_id = order.id;
    let mut order: order::ActiveModel = order.into();
    order.payment_status = Set(PaymentStatus::Paid);
    order.update(&*db).await?;

    info!(order_id, payment_id = %payload.payment_id, "payment verified");
    Ok(Json(json!({ "message": "Payment verified" })))
}

//Structs
#[derive(Deserialize, Debug)]
struct CreateGatewayOrder {
    order_id: i32,
}

#[derive(Deserialize, Debug)]
struct VerifyPayment {
    order_id: i32,
    gateway_order_id: String,
    payment_id: String,
    signature: String,
}
