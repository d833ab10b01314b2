mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{app, db_state, register, send, unique, user_payload};

#[tokio::test]
async fn register_login_profile_and_account_lifecycle() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let app = app(state);

    let email = format!("{}@example.com", unique("owner"));
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/user/create",
        None,
        Some(user_payload(&email)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["is_admin"], false);
    assert!(body["data"].get("password_hash").is_none());

    // Same live email twice is refused.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/user/create",
        None,
        Some(user_payload(&email)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Email is already taken");

    let credentials = json!({ "email": email, "password": "userpassword" });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/user/login",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(body["data"]["expiry"].is_string());

    let (status, body) = send(&app, Method::GET, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email.as_str());
    assert!(body["data"]["last_login_at"].is_string());

    // A customer may not log in as admin, and wrong passwords look the same.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/admin/login",
        None,
        Some(credentials),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Failed to authenticate user");
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/user/login",
        None,
        Some(json!({ "email": email, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Failed to authenticate user");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/user",
        Some(&token),
        Some(json!({ "first_name": "Janet" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["first_name"], "Janet");
    assert_eq!(body["data"]["last_name"], "Doe");

    let (status, _) = send(&app, Method::GET, "/api/v1/admin/user-listing", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    // The token outlives the account but no longer authenticates.
    let (status, _) = send(&app, Method::GET, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn password_reset_round_trip() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let app = app(state);
    let email = format!("{}@Example.com", unique("Forgetful"));
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/user/create",
        None,
        Some(user_payload(&email)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], email.to_lowercase());
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Only the token holder's own address may be reset.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/user/forgot-password",
        Some(&token),
        Some(json!({ "email": "someone-else@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/user/forgot-password",
        Some(&token),
        Some(json!({ "email": email.to_lowercase() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let reset_token = body["data"]["reset_token"].as_str().unwrap().to_string();

    // A signed-in user cannot spend a reset token on someone else's account.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/user/reset-password-token",
        Some(&token),
        Some(json!({
            "token": reset_token,
            "email": "someone-else@example.com",
            "password": "brand-new-password",
            "password_confirmation": "brand-new-password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let reset = json!({
        "token": reset_token,
        "email": email.to_uppercase(),
        "password": "brand-new-password",
        "password_confirmation": "brand-new-password"
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/user/reset-password-token",
        Some(&token),
        Some(reset.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Tokens are single use.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/user/reset-password-token",
        Some(&token),
        Some(reset),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/user/login",
        None,
        Some(json!({ "email": email.to_lowercase(), "password": "brand-new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn admin_manages_customers_but_not_other_admins() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let app = app(state);
    let (_, admin_token) = register(&app, true).await;
    let (other_admin_id, _) = register(&app, true).await;
    let (customer_id, _) = register(&app, false).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/admin/user-listing?limit=100&marketing=true",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let items = body["data"]["items"].as_array().unwrap();
    assert!(items.iter().all(|user| user["is_admin"] == false));
    assert_eq!(body["meta"]["per_page"], 100);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/admin/user-edit/{customer_id}"),
        Some(&admin_token),
        Some(json!({ "address": "1 New Street" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["address"], "1 New Street");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/admin/user-delete/{other_admin_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/admin/user-delete/{customer_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
