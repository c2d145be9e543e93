mod common;

use common::spawn_app;

#[tokio::test]
async fn duplicate_email_is_rejected_and_original_account_survives() {
    let app = spawn_app().await;

    app.register("first_user", "shared@example.com", "Password99").await;

    let response = app
        .client
        .post(format!("{}/register", app.base_url))
        .json(&serde_json::json!({
            "username": "second_user",
            "email": "shared@example.com",
            "password": "Password99",
            "contact": "5550000000"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    // The first account still logs in.
    app.login_token("shared@example.com", "Password99").await;
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = spawn_app().await;

    app.register("taken_name", "one@example.com", "Password99").await;

    let response = app
        .client
        .post(format!("{}/register", app.base_url))
        .json(&serde_json::json!({
            "username": "taken_name",
            "email": "two@example.com",
            "password": "Password99",
            "contact": "5550000000"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_registration_is_rejected() {
    let app = spawn_app().await;

    // Bad email, short password.
    let response = app
        .client
        .post(format!("{}/register", app.base_url))
        .json(&serde_json::json!({
            "username": "someone",
            "email": "not-an-email",
            "password": "short",
            "contact": "5550000000"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_yields_401_and_no_token() {
    let app = spawn_app().await;

    app.register("careful_user", "careful@example.com", "Password99").await;

    let response = app.login("careful@example.com", "WrongPassword").await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert!(body.get("token").is_none());
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn unknown_email_yields_the_same_401() {
    let app = spawn_app().await;

    let response = app.login("ghost@example.com", "Password99").await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_non_admin_credentials() {
    let app = spawn_app().await;

    let user_token = app
        .register("plain_user", "plain@example.com", "Password99")
        .await;

    // No credential at all.
    let response = app
        .client
        .get(format!("{}/admin/stats", app.base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Valid credential without the admin flag.
    let response = app
        .client
        .get(format!("{}/admin/stats", app.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    // The admin flag opens the door.
    let admin_token = app.admin_token().await;
    let response = app
        .client
        .get(format!("{}/admin/stats", app.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(format!("{}/profile", app.base_url))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}
