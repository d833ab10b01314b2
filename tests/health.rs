mod common;

use axum::http::{Method, StatusCode};
use pet_shop_api::error::UNAUTHORIZED_MESSAGE;
use serde_json::json;

use common::{app, offline_state, send, send_raw};

#[tokio::test]
async fn health_reports_database_down_without_failing() -> anyhow::Result<()> {
    let app = app(offline_state()?);
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Health check");
    assert_eq!(body["data"]["status"], "degraded");
    assert_eq!(body["data"]["database"], "down");
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_bearer_token() -> anyhow::Result<()> {
    let app = app(offline_state()?);

    let (status, body) = send(&app, Method::GET, "/api/v1/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], UNAUTHORIZED_MESSAGE);

    let (status, _) = send(&app, Method::GET, "/api/v1/orders", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected_before_any_lookup() -> anyhow::Result<()> {
    let state = offline_state()?;
    let issued = state.jwt.issue_at(
        uuid::Uuid::new_v4(),
        "old@example.com",
        chrono::Utc::now() - chrono::Duration::minutes(31),
    )?;
    let app = app(state);

    let (status, _) = send(&app, Method::GET, "/api/v1/user", Some(&issued.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn invalid_registration_is_unprocessable() -> anyhow::Result<()> {
    let app = app(offline_state()?);
    let payload = json!({
        "first_name": "",
        "last_name": "Doe",
        "email": "not-an-email",
        "password": "short",
        "password_confirmation": "other",
        "address": "somewhere",
        "phone_number": "123"
    });

    let (status, body) = send(&app, Method::POST, "/api/v1/user/create", None, Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Error Validating Request");
    let errors = &body["data"]["errors"];
    assert!(errors.get("email").is_some());
    assert!(errors.get("password_confirmation").is_some());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_unprocessable() -> anyhow::Result<()> {
    let app = app(offline_state()?);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/user/login",
        None,
        Some(json!({ "email": "a@b.co" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn unknown_paths_fall_through_to_not_found() -> anyhow::Result<()> {
    let app = app(offline_state()?);
    let (status, body) = send(&app, Method::GET, "/api/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/api/v1/nope");
    Ok(())
}

#[tokio::test]
async fn responses_carry_a_request_id() -> anyhow::Result<()> {
    let app = app(offline_state()?);
    let (_, _, headers) = send_raw(&app, Method::GET, "/api/v1/nope", None, None).await;
    assert!(headers.contains_key("x-request-id"));
    Ok(())
}
