use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::File,
    response::ApiResponse,
    services::file_service::{self, MAX_UPLOAD_BYTES},
    state::AppState,
};

/// Multipart framing on top of the largest accepted file.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/file/upload",
            post(upload_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/file/{uuid}", get(download_file))
}

#[utoipa::path(
    post,
    path = "/api/v1/file/upload",
    request_body(
        content = inline(String),
        description = "Multipart form with a `file` field",
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "File uploaded", body = ApiResponse<File>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid file"),
    ),
    security(("bearer_auth" = [])),
    tag = "File"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<File>>)> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        tracing::warn!(error = %err, "failed to read multipart field");
        AppError::Unprocessable(format!("Invalid multipart data: {err}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(|err| {
            tracing::warn!(error = %err, file_name = %file_name, "failed to read upload");
            AppError::Unprocessable(format!("Could not read file '{file_name}'"))
        })?;
        let resp = file_service::upload_file(&state, &user, file_name, data.to_vec()).await?;
        return Ok((StatusCode::CREATED, Json(resp)));
    }
    Err(AppError::Unprocessable("The file field is required".into()))
}

/// Strip anything that could break out of a quoted header value.
fn attachment_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    if cleaned.trim().is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}

pub(crate) fn attachment(content_type: &str, file_name: &str, data: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attachment_name(file_name)),
            ),
        ],
        data,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/file/{uuid}",
    params(("uuid" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "File not found"),
    ),
    tag = "File"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> AppResult<Response> {
    let (file, data) = file_service::read_file(&state, uuid).await?;
    Ok(attachment(&file.mime_type, &file.name, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_name_drops_quotes_and_control_chars() {
        assert_eq!(attachment_name("re\"port\n.pdf"), "report.pdf");
        assert_eq!(attachment_name("\"\""), "download");
        assert_eq!(attachment_name("cat.png"), "cat.png");
    }

    #[test]
    fn attachment_sets_disposition() {
        let resp = attachment("image/png", "cat.png", vec![1, 2, 3]);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"cat.png\""
        );
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    }
}
