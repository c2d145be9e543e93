mod common;

use common::spawn_app;

#[tokio::test]
async fn feedback_requires_a_delivered_order() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;
    let token = app
        .register("fb_user", "fb@example.com", "Password99")
        .await;

    let product = app
        .create_product(&admin_token, "Rasmalai", 110.0, "desserts")
        .await;
    let order_id = app
        .place_order(&token, serde_json::json!([{ "product_id": product, "quantity": 1 }]))
        .await;

    // Still `placed`.
    let response = app
        .client
        .post(format!("{}/feedback", app.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "order_id": order_id,
            "product_id": product,
            "rating": 5,
            "comment": "Lovely"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn feedback_lifecycle_with_eligibility() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;
    let token = app
        .register("fb_user2", "fb2@example.com", "Password99")
        .await;

    let kulfi = app
        .create_product(&admin_token, "Kulfi", 65.0, "desserts")
        .await;
    let jalebi = app
        .create_product(&admin_token, "Jalebi", 55.0, "desserts")
        .await;
    let order_id = app
        .place_order(
            &token,
            serde_json::json!([
                { "product_id": kulfi, "quantity": 1 },
                { "product_id": jalebi, "quantity": 2 }
            ]),
        )
        .await;
    app.deliver_order(&admin_token, order_id).await;

    // Both items are ungraded at first.
    let eligible = app
        .client
        .get(format!("{}/feedback/eligible", app.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let orders = eligible.as_array().expect("Expected array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_id"], order_id);
    assert_eq!(orders[0]["items"].as_array().expect("items").len(), 2);

    // Grade one.
    let response = app
        .client
        .post(format!("{}/feedback", app.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "order_id": order_id,
            "product_id": kulfi,
            "rating": 4,
            "comment": "Creamy"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    // Grading the same item again conflicts.
    let response = app
        .client
        .post(format!("{}/feedback", app.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "order_id": order_id,
            "product_id": kulfi,
            "rating": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    // The graded item left the eligibility set, the other remains.
    let eligible = app
        .client
        .get(format!("{}/feedback/eligible", app.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let orders = eligible.as_array().expect("Expected array");
    assert_eq!(orders.len(), 1);
    let items = orders[0]["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], jalebi);

    // Grade the rest; the order disappears from eligibility.
    let response = app
        .client
        .post(format!("{}/feedback", app.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "order_id": order_id,
            "product_id": jalebi,
            "rating": 5
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let eligible = app
        .client
        .get(format!("{}/feedback/eligible", app.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert!(eligible.as_array().expect("Expected array").is_empty());

    // The records show up on the admin side.
    let records = app
        .client
        .get(format!("{}/admin/feedback", app.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(records.as_array().expect("Expected array").len(), 2);
}

#[tokio::test]
async fn feedback_is_rejected_for_items_outside_the_order() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;
    let token = app
        .register("fb_user3", "fb3@example.com", "Password99")
        .await;

    let ordered = app
        .create_product(&admin_token, "Halwa", 75.0, "desserts")
        .await;
    let not_ordered = app
        .create_product(&admin_token, "Barfi", 95.0, "desserts")
        .await;
    let order_id = app
        .place_order(&token, serde_json::json!([{ "product_id": ordered, "quantity": 1 }]))
        .await;
    app.deliver_order(&admin_token, order_id).await;

    let response = app
        .client
        .post(format!("{}/feedback", app.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "order_id": order_id,
            "product_id": not_ordered,
            "rating": 3
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feedback_on_someone_elses_order_is_not_found() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;
    let buyer = app
        .register("fb_buyer", "fbbuyer@example.com", "Password99")
        .await;
    let other = app
        .register("fb_other", "fbother@example.com", "Password99")
        .await;

    let product = app
        .create_product(&admin_token, "Kheer", 70.0, "desserts")
        .await;
    let order_id = app
        .place_order(&buyer, serde_json::json!([{ "product_id": product, "quantity": 1 }]))
        .await;
    app.deliver_order(&admin_token, order_id).await;

    let response = app
        .client
        .post(format!("{}/feedback", app.base_url))
        .bearer_auth(&other)
        .json(&serde_json::json!({
            "order_id": order_id,
            "product_id": product,
            "rating": 5
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;
    let token = app
        .register("fb_user4", "fb4@example.com", "Password99")
        .await;

    let product = app
        .create_product(&admin_token, "Laddu", 45.0, "desserts")
        .await;
    let order_id = app
        .place_order(&token, serde_json::json!([{ "product_id": product, "quantity": 1 }]))
        .await;
    app.deliver_order(&admin_token, order_id).await;

    for rating in [0, 6] {
        let response = app
            .client
            .post(format!("{}/feedback", app.base_url))
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "order_id": order_id,
                "product_id": product,
                "rating": rating
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }
}
