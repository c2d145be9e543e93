mod common;

use common::spawn_app;

#[tokio::test]
async fn profile_reads_back_without_the_password() {
    let app = spawn_app().await;
    let token = app
        .register("profile_user", "profile@example.com", "Password99")
        .await;

    let body = app
        .client
        .get(format!("{}/profile", app.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");

    assert_eq!(body["username"], "profile_user");
    assert_eq!(body["email"], "profile@example.com");
    assert_eq!(body["is_admin"], false);
    assert!(body.get("password").is_none());
    assert!(body["addresses"].as_array().expect("addresses").is_empty());
}

#[tokio::test]
async fn password_change_takes_effect_on_next_login() {
    let app = spawn_app().await;
    let token = app
        .register("rotating_user", "rotate@example.com", "Password99")
        .await;

    let response = app
        .client
        .patch(format!("{}/profile", app.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "password": "NewPassword11" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = app.login("rotate@example.com", "Password99").await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    app.login_token("rotate@example.com", "NewPassword11").await;
}

#[tokio::test]
async fn addresses_can_be_added_and_removed() {
    let app = spawn_app().await;
    let token = app
        .register("address_user", "address@example.com", "Password99")
        .await;

    let response = app
        .client
        .post(format!("{}/profile/address", app.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "label": "Home",
            "line": "12 Curry Lane",
            "city": "Pune",
            "postal_code": "411001"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let address_id = body["id"].as_i64().expect("address id");

    let profile = app
        .client
        .get(format!("{}/profile", app.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(profile["addresses"].as_array().expect("addresses").len(), 1);
    assert_eq!(profile["addresses"][0]["label"], "Home");

    let response = app
        .client
        .delete(format!("{}/profile/address/{address_id}", app.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let profile = app
        .client
        .get(format!("{}/profile", app.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert!(profile["addresses"].as_array().expect("addresses").is_empty());
}

#[tokio::test]
async fn addresses_are_scoped_to_their_owner() {
    let app = spawn_app().await;
    let owner = app
        .register("addr_owner", "addrowner@example.com", "Password99")
        .await;
    let intruder = app
        .register("addr_intruder", "addrintruder@example.com", "Password99")
        .await;

    let response = app
        .client
        .post(format!("{}/profile/address", app.base_url))
        .bearer_auth(&owner)
        .json(&serde_json::json!({
            "label": "Work",
            "line": "1 Office Park",
            "city": "Mumbai",
            "postal_code": "400001"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let address_id = body["id"].as_i64().expect("address id");

    let response = app
        .client
        .delete(format!("{}/profile/address/{address_id}", app.base_url))
        .bearer_auth(&intruder)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
