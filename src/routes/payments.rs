use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::payments::PaymentRequest,
    error::AppResult,
    extract::ValidatedJson,
    middleware::auth::AuthUser,
    models::Payment,
    response::{ApiResponse, ListData},
    routes::params::PaymentQuery,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments))
        .route("/payment/create", post(create_payment))
        .route(
            "/payment/{uuid}",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(PaymentQuery),
    responses((status = 200, description = "List payments", body = ApiResponse<ListData<Payment>>)),
    tag = "Payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentQuery>,
) -> AppResult<Json<ApiResponse<ListData<Payment>>>> {
    let resp = payment_service::list_payments(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/payment/{uuid}",
    params(("uuid" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Get payment", body = ApiResponse<Payment>),
        (status = 404, description = "Payment not found"),
    ),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_payment(&state, uuid).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/create",
    request_body = PaymentRequest,
    responses(
        (status = 201, description = "Create payment", body = ApiResponse<Payment>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<PaymentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Payment>>)> {
    let resp = payment_service::create_payment(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/v1/payment/{uuid}",
    params(("uuid" = Uuid, Path, description = "Payment ID")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Update payment", body = ApiResponse<Payment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Payment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn update_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::update_payment(&state, &user, uuid, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payment/{uuid}",
    params(("uuid" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Delete payment"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Payment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = payment_service::delete_payment(&state, &user, uuid).await?;
    Ok(Json(resp))
}
