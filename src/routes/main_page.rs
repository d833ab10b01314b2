use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::content::{PostRequest, PromotionRequest},
    error::AppResult,
    extract::ValidatedJson,
    middleware::auth::AuthUser,
    models::{Post, Promotion},
    response::{ApiResponse, ListData},
    routes::params::{ContentQuery, PromotionQuery},
    services::{post_service, promotion_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog", get(list_posts).post(create_post))
        .route(
            "/blog/{uuid}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/promotions", get(list_promotions).post(create_promotion))
        .route(
            "/promotions/{uuid}",
            put(update_promotion).delete(delete_promotion),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/main/blog",
    params(ContentQuery),
    responses((status = 200, description = "List posts", body = ApiResponse<ListData<Post>>)),
    tag = "MainPage"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> AppResult<Json<ApiResponse<ListData<Post>>>> {
    let resp = post_service::list_posts(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/main/blog/{uuid}",
    params(("uuid" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Get post", body = ApiResponse<Post>),
        (status = 404, description = "Post not found"),
    ),
    tag = "MainPage"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Post>>> {
    let resp = post_service::get_post(&state, uuid).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/main/blog",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Create post", body = ApiResponse<Post>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "MainPage"
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Post>>)> {
    let resp = post_service::create_post(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/v1/main/blog/{uuid}",
    params(("uuid" = Uuid, Path, description = "Post ID")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Update post", body = ApiResponse<Post>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "MainPage"
)]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> AppResult<Json<ApiResponse<Post>>> {
    let resp = post_service::update_post(&state, &user, uuid, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/main/blog/{uuid}",
    params(("uuid" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Delete post"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "MainPage"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = post_service::delete_post(&state, &user, uuid).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/main/promotions",
    params(PromotionQuery),
    responses((status = 200, description = "List promotions", body = ApiResponse<ListData<Promotion>>)),
    tag = "MainPage"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
    Query(query): Query<PromotionQuery>,
) -> AppResult<Json<ApiResponse<ListData<Promotion>>>> {
    let resp = promotion_service::list_promotions(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/main/promotions",
    request_body = PromotionRequest,
    responses(
        (status = 201, description = "Create promotion", body = ApiResponse<Promotion>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "MainPage"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<PromotionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Promotion>>)> {
    let resp = promotion_service::create_promotion(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/v1/main/promotions/{uuid}",
    params(("uuid" = Uuid, Path, description = "Promotion ID")),
    request_body = PromotionRequest,
    responses(
        (status = 200, description = "Update promotion", body = ApiResponse<Promotion>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Promotion not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "MainPage"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::update_promotion(&state, &user, uuid, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/main/promotions/{uuid}",
    params(("uuid" = Uuid, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Delete promotion"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Promotion not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "MainPage"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = promotion_service::delete_promotion(&state, &user, uuid).await?;
    Ok(Json(resp))
}
