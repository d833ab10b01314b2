use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::auth::{
        ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
        ResetPasswordRequest, UpdateUserRequest, UserRequest, UserWithToken,
    },
    error::AppResult,
    extract::ValidatedJson,
    middleware::auth::AuthUser,
    models::{Order, User},
    response::{ApiResponse, ListData},
    routes::params::OrderListQuery,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile).put(edit_profile).delete(delete_account))
        .route("/create", post(create_user))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password-token", post(reset_password))
        .route("/orders", get(my_orders))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/create",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserWithToken>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "User"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserWithToken>>)> {
    let resp = user_service::create_user(&state, payload, false).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 422, description = "Failed to authenticate user"),
    ),
    tag = "User"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = user_service::login(&state, payload, false).await?;
    Ok(Json(resp))
}

/// Tokens simply expire, so there is nothing to revoke.
#[utoipa::path(
    get,
    path = "/api/v1/user/logout",
    responses((status = 200, description = "Logged out")),
    tag = "User"
)]
pub async fn logout() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::message("Logged out"))
}

#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn edit_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::edit_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = user_service::delete_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset token created", body = ApiResponse<ForgotPasswordResponse>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<ForgotPasswordResponse>>> {
    let resp = user_service::forgot_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/reset-password-token",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 404, description = "Email is not the token holder's"),
        (status = 422, description = "Invalid or expired token"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = user_service::reset_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<ListData<Order>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<ListData<Order>>>> {
    let resp = user_service::my_orders(&state, &user, query).await?;
    Ok(Json(resp))
}
