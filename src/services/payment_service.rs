use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::payments::{PaymentDetails, PaymentRequest},
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        payment_types::{Column as PaymentTypeCol, Entity as PaymentTypes, Model as PaymentTypeModel},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments, Model as PaymentModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_admin},
    models::{Payment, payment_from_entity},
    response::{ApiResponse, ListData, Meta},
    routes::params::{Pagination, PaymentQuery, SortOrder},
    services::{fetch_page, now, order_service},
    state::AppState,
};

pub(crate) async fn find_live<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<PaymentModel>> {
    Ok(Payments::find_by_id(id)
        .filter(PaymentCol::DeletedAt.is_null())
        .one(conn)
        .await?)
}

pub(crate) async fn find_payment_type<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> AppResult<Option<PaymentTypeModel>> {
    Ok(PaymentTypes::find()
        .filter(PaymentTypeCol::Slug.eq(slug))
        .filter(PaymentTypeCol::DeletedAt.is_null())
        .one(conn)
        .await?)
}

async fn checked_details<C: ConnectionTrait>(conn: &C, payload: &PaymentRequest) -> AppResult<Value> {
    if find_payment_type(conn, &payload.payment_type).await?.is_none() {
        return Err(AppError::Unprocessable(format!(
            "Payment type {} does not exist",
            payload.payment_type
        )));
    }
    let details = Value::Object(payload.details.clone());
    PaymentDetails::parse(&payload.payment_type, &details)?;
    Ok(details)
}

/// Payments are owned through the orders they pay for. A payment that no
/// order references yet may be managed by any signed-in user.
async fn ensure_can_manage<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    payment_id: Uuid,
) -> AppResult<()> {
    if user.is_admin {
        return Ok(());
    }
    let orders = Orders::find()
        .filter(OrderCol::PaymentId.eq(payment_id))
        .filter(OrderCol::DeletedAt.is_null())
        .all(conn)
        .await?;
    if orders.is_empty() || orders.iter().any(|order| order.user_id == user.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

async fn attach_to_order<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    order_id: Uuid,
    payment_id: Uuid,
) -> AppResult<()> {
    let order = order_service::find_live(conn, order_id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    ensure_owner_or_admin(user, order.user_id)?;

    let mut active: OrderActive = order.into();
    active.payment_id = Set(Some(payment_id));
    active.updated_at = Set(now());
    active.update(conn).await?;
    tracing::info!(order_id = %order_id, payment_id = %payment_id, "payment attached to order");
    Ok(())
}

pub async fn list_payments(
    state: &AppState,
    query: PaymentQuery,
) -> AppResult<ApiResponse<ListData<Payment>>> {
    let finder = Payments::find()
        .filter(PaymentCol::DeletedAt.is_null())
        .order_by(
            query.sort_by.unwrap_or_default().column(),
            SortOrder::from_desc(query.desc).as_order(),
        )
        .order_by_asc(PaymentCol::Id);

    let (items, meta) =
        fetch_page(finder, Pagination::new(query.page, query.limit), &state.orm).await?;
    let items = items.into_iter().map(payment_from_entity).collect();
    Ok(ApiResponse::success("Payments", ListData { items }, Some(meta)))
}

pub async fn get_payment(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Payment>> {
    let payment = find_live(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("Payment"))?;
    Ok(ApiResponse::success("Payment", payment_from_entity(payment), Some(Meta::empty())))
}

pub async fn create_payment(
    state: &AppState,
    user: &AuthUser,
    payload: PaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    let txn = state.orm.begin().await?;
    let details = checked_details(&txn, &payload).await?;

    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        payment_type: Set(payload.payment_type),
        details: Set(details),
        response_status: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    if let Some(order_id) = payload.order_uuid {
        attach_to_order(&txn, user, order_id, payment.id).await?;
    }
    txn.commit().await?;

    Ok(ApiResponse::success("Payment created", payment_from_entity(payment), Some(Meta::empty())))
}

pub async fn update_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    let txn = state.orm.begin().await?;
    let payment = find_live(&txn, id).await?.ok_or(AppError::NotFound("Payment"))?;
    ensure_can_manage(&txn, user, payment.id).await?;
    let details = checked_details(&txn, &payload).await?;

    let mut active: PaymentActive = payment.into();
    active.payment_type = Set(payload.payment_type);
    active.details = Set(details);
    active.updated_at = Set(now());
    let payment = active.update(&txn).await?;

    if let Some(order_id) = payload.order_uuid {
        attach_to_order(&txn, user, order_id, payment.id).await?;
    }
    txn.commit().await?;

    Ok(ApiResponse::success("Payment updated", payment_from_entity(payment), Some(Meta::empty())))
}

pub async fn delete_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let payment = find_live(&txn, id).await?.ok_or(AppError::NotFound("Payment"))?;
    ensure_can_manage(&txn, user, payment.id).await?;

    Orders::update_many()
        .col_expr(OrderCol::PaymentId, Expr::value(Option::<Uuid>::None))
        .filter(OrderCol::PaymentId.eq(payment.id))
        .exec(&txn)
        .await?;

    let mut active: PaymentActive = payment.into();
    active.deleted_at = Set(Some(now()));
    active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::message("Payment deleted"))
}

/// Store what the payment gateway sent back for an order's payment.
pub async fn record_gateway_response(
    state: &AppState,
    order_id: Uuid,
    params: BTreeMap<String, String>,
) -> AppResult<ApiResponse<Payment>> {
    let txn = state.orm.begin().await?;
    let order = order_service::find_live(&txn, order_id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    let payment = match order.payment_id {
        Some(payment_id) => find_live(&txn, payment_id).await?,
        None => None,
    }
    .ok_or_else(|| {
        tracing::warn!(order_id = %order_id, "gateway callback for an order without payment");
        AppError::BadGateway("Order has no payment to update".into())
    })?;

    let response: serde_json::Map<String, Value> = params
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    let mut active: PaymentActive = payment.into();
    active.response_status = Set(Some(Value::Object(response)));
    active.updated_at = Set(now());
    let payment = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order_id, payment_id = %payment.id, "payment response recorded");
    Ok(ApiResponse::success("Payment updated", payment_from_entity(payment), Some(Meta::empty())))
}
