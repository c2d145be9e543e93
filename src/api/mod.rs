pub mod admin;
pub mod public;
pub mod user;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::middleware::logging::logging_middleware;

use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .nest("/api", public_api_router(db.clone(), config.clone()))
        .nest("/api", user_api_router(db.clone(), config.clone()))
        .nest("/api/admin", admin_api_router(db, config))
        .layer(from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
}
