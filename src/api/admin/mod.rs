pub mod order;
pub mod product;
pub mod stats;
pub mod upload;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::auth::{auth_middleware, AuthState};

use order::admin_order_router;
use product::admin_product_router;
use stats::stats_router;
use upload::upload_router;

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let admin_product_router = admin_product_router(db.clone());
    let admin_order_router = admin_order_router(db.clone());
    let upload_router = upload_router(db.clone(), config.clone());
    let stats_router = stats_router(db.clone());

    Router::new()
        .nest("/", admin_product_router)
        .nest("/", admin_order_router)
        .nest("/", upload_router)
        .nest("/", stats_router)
        .layer(from_fn_with_state(
            AuthState {
                db,
                config,
                require_admin: true,
            },
            auth_middleware,
        ))
}
