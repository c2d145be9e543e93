use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use feastly::api::create_api_router;
use feastly::config::Config;
use feastly::entities::{seed_admin, setup_schema};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let config = Arc::new(Config::load());

    let db: DatabaseConnection = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    setup_schema(&db).await.expect("Failed to create schema");

    let shared_db = Arc::new(db);

    seed_admin(shared_db.clone(), &config)
        .await
        .expect("Failed to seed admin account");

    let app = create_api_router(shared_db, config.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("Failed to bind listener");
    tracing::info!(port = config.port, "feastly backend running");
    axum::serve(listener, app).await.expect("Server failed");
}
