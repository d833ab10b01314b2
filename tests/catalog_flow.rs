mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::json;
use tower::ServiceExt;

use common::{app, db_state, register, send, send_raw, unique};

#[tokio::test]
async fn taxonomy_slugs_are_unique_and_deletes_are_soft() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let app = app(state);
    let (_, admin) = register(&app, true).await;
    let slug = unique("cat");

    let payload = json!({ "title": "Cats", "slug": slug });
    let (status, body) = send(&app, Method::POST, "/api/v1/category/create", Some(&admin), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/api/v1/category/create", Some(&admin), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/category/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], slug.as_str());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/category/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::GET, &format!("/api/v1/category/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
    Ok(())
}

#[tokio::test]
async fn promotions_default_to_the_running_ones() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let app = app(state);
    let (_, admin) = register(&app, true).await;
    let today = Utc::now().date_naive();

    let running_title = unique("running");
    let expired_title = unique("expired");
    for (title, from, to) in [
        (&running_title, today - Duration::days(1), today + Duration::days(1)),
        (&expired_title, today - Duration::days(10), today - Duration::days(5)),
    ] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/main/promotions",
            Some(&admin),
            Some(json!({
                "title": title,
                "content": "Half price",
                "metadata": { "valid_from": from, "valid_to": to }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let titles = |body: &serde_json::Value| -> Vec<String> {
        body["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = send(&app, Method::GET, "/api/v1/main/promotions?limit=100", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = titles(&body);
    assert!(listed.contains(&running_title));
    assert!(!listed.contains(&expired_title));

    let (_, body) = send(&app, Method::GET, "/api/v1/main/promotions?valid=false&limit=100", None, None).await;
    assert!(titles(&body).contains(&expired_title));

    // Inverted windows never reach the database.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/main/promotions",
        Some(&admin),
        Some(json!({
            "title": "Backwards",
            "content": "x",
            "metadata": { "valid_from": today, "valid_to": today - Duration::days(1) }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn uploaded_files_download_with_their_name() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let app = app(state);
    let (_, token) = register(&app, false).await;

    let boundary = "pet-shop-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"dog.png\"\r\n\
         Content-Type: image/png\r\n\r\nnot really a png\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/file/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
    let file = &body["data"];
    assert_eq!(file["mime_type"], "image/png");
    assert_eq!(file["size"], "16 B");
    let id = file["id"].as_str().unwrap();
    assert_eq!(file["path"], format!("pet-shop/{id}.png"));

    let (status, bytes, headers) = send_raw(&app, Method::GET, &format!("/api/v1/file/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"not really a png");
    assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=\"dog.png\"");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/file/{}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "File not found");
    Ok(())
}
