pub mod auth;
pub mod image;
pub mod product;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;

use auth::auth_router;
use image::image_router;
use product::product_router;

pub fn public_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let auth_router = auth_router(db.clone(), config.clone());
    let product_router = product_router(db.clone());
    let image_router = image_router(db, config);

    Router::new()
        .nest("/", auth_router)
        .nest("/", product_router)
        .nest("/", image_router)
}
