use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderDetail, OrderRequest, OrderSummary},
    error::AppResult,
    extract::ValidatedJson,
    middleware::auth::AuthUser,
    models::{Order, Payment},
    response::{ApiResponse, ListData},
    routes::{
        files::attachment,
        params::{DashboardQuery, OrderListQuery, ShipmentLocatorQuery},
    },
    services::{order_service, payment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/dashboard", get(dashboard))
        .route("/orders/shipment-locator", get(shipment_locator))
        .route("/order/create", post(create_order))
        .route("/order/payment/{order_uuid}", get(payment_callback))
        .route(
            "/order/{uuid}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/order/{uuid}/download", get(download_invoice))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "List orders", body = ApiResponse<ListData<Order>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<ListData<Order>>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Order summaries", body = ApiResponse<ListData<OrderSummary>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<ApiResponse<ListData<OrderSummary>>>> {
    let resp = order_service::dashboard(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/shipment-locator",
    params(ShipmentLocatorQuery),
    responses(
        (status = 200, description = "Shipped orders", body = ApiResponse<ListData<OrderSummary>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn shipment_locator(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ShipmentLocatorQuery>,
) -> AppResult<Json<ApiResponse<ListData<OrderSummary>>>> {
    let resp = order_service::shipment_locator(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/order/create",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderDetail>),
        (status = 400, description = "No requested product exists"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<OrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderDetail>>)> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/order/{uuid}",
    params(("uuid" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Get order", body = ApiResponse<OrderDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order(&state, &user, uuid).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/order/{uuid}",
    params(("uuid" = Uuid, Path, description = "Order ID")),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<OrderDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<OrderRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::update_order(&state, &user, uuid, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/order/{uuid}",
    params(("uuid" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, uuid).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/order/{uuid}/download",
    params(("uuid" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Invoice PDF", content_type = "application/pdf"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn download_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<Uuid>,
) -> AppResult<Response> {
    let (file_name, pdf) = order_service::download_invoice(&state, &user, uuid).await?;
    Ok(attachment("application/pdf", &file_name, pdf))
}

#[utoipa::path(
    get,
    path = "/api/v1/order/payment/{order_uuid}",
    params(("order_uuid" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Gateway response stored", body = ApiResponse<Payment>),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Order has no payment"),
    ),
    tag = "Orders"
)]
pub async fn payment_callback(
    State(state): State<AppState>,
    Path(order_uuid): Path<Uuid>,
    Query(params): Query<BTreeMap<String, String>>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::record_gateway_response(&state, order_uuid, params).await?;
    Ok(Json(resp))
}
