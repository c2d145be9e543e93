pub mod cart;
pub mod feedback;
pub mod order;
pub mod payment;
pub mod profile;
pub mod wishlist;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::auth::{auth_middleware, AuthState};

use cart::cart_router;
use feedback::feedback_router;
use order::order_router;
use payment::payment_router;
use profile::profile_router;
use wishlist::wishlist_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .nest("/", cart_router(db.clone()))
        .nest("/", wishlist_router(db.clone()))
        .nest("/", order_router(db.clone()))
        .nest("/", feedback_router(db.clone()))
        .nest("/", payment_router(db.clone(), config.clone()))
        .nest("/", profile_router(db.clone()))
        .layer(from_fn_with_state(
            AuthState {
                db,
                config,
                require_admin: false,
            },
            auth_middleware,
        ))
}
