use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, UpdateUserRequest, UserRequest, UserWithToken},
    error::AppResult,
    extract::ValidatedJson,
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, ListData},
    routes::params::UserListingQuery,
    services::{admin_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_admin))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user-listing", get(list_users))
        .route("/user-edit/{uuid}", put(edit_user))
        .route("/user-delete/{uuid}", delete(delete_user))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/create",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<UserWithToken>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Admin"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserWithToken>>)> {
    let resp = user_service::create_user(&state, payload, true).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 422, description = "Failed to authenticate user"),
    ),
    tag = "Admin"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = user_service::login(&state, payload, true).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    responses((status = 200, description = "Logged out")),
    tag = "Admin"
)]
pub async fn logout() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::message("Logged out"))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/user-listing",
    params(UserListingQuery),
    responses(
        (status = 200, description = "Customer accounts", body = ApiResponse<ListData<User>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListingQuery>,
) -> AppResult<Json<ApiResponse<ListData<User>>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/user-edit/{uuid}",
    params(("uuid" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn edit_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::edit_user(&state, &user, uuid, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/user-delete/{uuid}",
    params(("uuid" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_user(&state, &user, uuid).await?;
    Ok(Json(resp))
}
