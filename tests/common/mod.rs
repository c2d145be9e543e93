#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;

use feastly::api::create_api_router;
use feastly::config::Config;
use feastly::entities::image::{self, FileExtension};
use feastly::entities::{seed_admin, setup_schema};

pub const ADMIN_EMAIL: &str = "admin@feastly.local";
pub const ADMIN_PASSWORD: &str = "ChangeMe15";

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub db: Arc<DatabaseConnection>,
}

/// Boots the full router against a private in-memory database and serves it
/// on an ephemeral port.
pub async fn spawn_app() -> TestApp {
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("SECRET", "integration-test-secret");
    std::env::set_var("GATEWAY_KEY_SECRET", "integration-gateway-secret");
    std::env::set_var("ADMIN_PASSWORD", ADMIN_PASSWORD);

    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await.expect("Failed to connect");
    setup_schema(&db).await.expect("Failed to create schema");
    let db = Arc::new(db);

    let config = Arc::new(Config::load());
    seed_admin(db.clone(), &config)
        .await
        .expect("Failed to seed admin");

    let app = create_api_router(db.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        base_url: format!("http://{addr}/api"),
        client: Client::new(),
        db,
    }
}

impl TestApp {
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(format!("{}/register", self.base_url))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
                "contact": "5551234567"
            }))
            .send()
            .await
            .expect("Failed to send register request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        token_from(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send login request")
    }

    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        token_from(response).await
    }

    pub async fn admin_token(&self) -> String {
        self.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Inserts an image row directly so products can reference one without
    /// going through the multipart upload.
    pub async fn seed_image(&self, name: &str) -> i32 {
        let row = image::ActiveModel {
            file_name: Set(name.to_owned()),
            path_name: Set(format!("path-{name}")),
            extension: Set(FileExtension::Png),
            ..Default::default()
        };
        image::Entity::insert(row)
            .exec(&*self.db)
            .await
            .expect("Failed to seed image")
            .last_insert_id
    }

    pub async fn create_product(
        &self,
        admin_token: &str,
        name: &str,
        price: f32,
        category: &str,
    ) -> i32 {
        let image_id = self.seed_image(name).await;
        let response = self
            .client
            .post(format!("{}/admin/product", self.base_url))
            .bearer_auth(admin_token)
            .json(&serde_json::json!({
                "name": name,
                "description": format!("{name} description"),
                "category": category,
                "price": price,
                "image_id": image_id
            }))
            .send()
            .await
            .expect("Failed to send create product request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse response JSON");
        body["id"].as_i64().expect("Missing product id") as i32
    }

    pub async fn place_order(&self, token: &str, items: serde_json::Value) -> i32 {
        let response = self
            .client
            .post(format!("{}/order", self.base_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "items": items }))
            .send()
            .await
            .expect("Failed to send place order request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse response JSON");
        body["order_id"].as_i64().expect("Missing order id") as i32
    }

    pub async fn set_order_status(&self, admin_token: &str, order_id: i32, status: &str) {
        let response = self
            .client
            .patch(format!("{}/admin/order/{}/status", self.base_url, order_id))
            .bearer_auth(admin_token)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .expect("Failed to send status update request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    /// Walks an order all the way to `delivered`.
    pub async fn deliver_order(&self, admin_token: &str, order_id: i32) {
        for status in ["preparing", "prepared", "out_for_delivery", "delivered"] {
            self.set_order_status(admin_token, order_id, status).await;
        }
    }

    pub async fn profile_id(&self, token: &str) -> i32 {
        let response = self
            .client
            .get(format!("{}/profile", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send profile request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse response JSON");
        body["id"].as_i64().expect("Missing user id") as i32
    }
}

async fn token_from(response: reqwest::Response) -> String {
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    body["token"]
        .as_str()
        .expect("Missing token in response")
        .to_owned()
}
