use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::{
        orders::{OrderDetail, OrderRequest, OrderSummary},
        payments::PaymentDetails,
    },
    entity::{
        order_statuses::{Column as StatusCol, Entity as OrderStatuses, Model as StatusModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    invoice::{self, InvoiceCustomer, InvoiceData, InvoicePayment},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{
        Order, order_address, order_from_entity, order_line_items, order_status_from_entity,
        payment_from_entity,
    },
    pricing::{PricedOrder, price_line_items},
    response::{ApiResponse, ListData, Meta},
    routes::params::{
        DashboardQuery, DateRange, OrderListQuery, OrderSortBy, Pagination, ShipmentLocatorQuery,
        SortOrder, resolve_date_range,
    },
    services::{fetch_page, now, order_status_service, payment_service, product_service},
    state::AppState,
};

pub(crate) async fn find_live<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<OrderModel>> {
    Ok(Orders::find_by_id(id)
        .filter(OrderCol::DeletedAt.is_null())
        .one(conn)
        .await?)
}

async fn find_owned<C: ConnectionTrait>(conn: &C, user: &AuthUser, id: Uuid) -> AppResult<OrderModel> {
    let order = find_live(conn, id).await?.ok_or(AppError::NotFound("Order"))?;
    ensure_owner_or_admin(user, order.user_id)?;
    Ok(order)
}

/// Price the requested products against the live catalog.
async fn price_request<C: ConnectionTrait>(conn: &C, payload: &OrderRequest) -> AppResult<PricedOrder> {
    let ids: Vec<Uuid> = payload
        .products
        .iter()
        .map(|line| line.uuid)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let catalog = product_service::find_live_many(conn, ids)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect::<HashMap<_, _>>();

    let priced = price_line_items(&payload.products, &catalog)?;
    if priced.products.is_empty() {
        return Err(AppError::BadRequest("None of the requested products exist".into()));
    }
    Ok(priced)
}

async fn ensure_references<C: ConnectionTrait>(conn: &C, payload: &OrderRequest) -> AppResult<()> {
    if order_status_service::find_live(conn, payload.order_status_uuid)
        .await?
        .is_none()
    {
        return Err(AppError::Unprocessable("Order status does not exist".into()));
    }
    if let Some(payment_id) = payload.payment_uuid {
        if payment_service::find_live(conn, payment_id).await?.is_none() {
            return Err(AppError::Unprocessable("Payment does not exist".into()));
        }
    }
    Ok(())
}

fn address_value(payload: &OrderRequest) -> AppResult<serde_json::Value> {
    serde_json::to_value(&payload.address)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode address: {e}")))
}

fn line_items_value(priced: &PricedOrder) -> AppResult<serde_json::Value> {
    serde_json::to_value(&priced.products)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode line items: {e}")))
}

async fn order_detail<C: ConnectionTrait>(conn: &C, order: OrderModel) -> AppResult<OrderDetail> {
    let order_status = order_status_service::find_live(conn, order.order_status_id)
        .await?
        .map(order_status_from_entity);
    let payment = match order.payment_id {
        Some(payment_id) => payment_service::find_live(conn, payment_id)
            .await?
            .map(payment_from_entity),
        None => None,
    };
    Ok(OrderDetail {
        order: order_from_entity(order),
        order_status,
        payment,
    })
}

/// Orders sorted and paged; limited to one customer when `user_id` is given.
pub async fn list_orders_for(
    state: &AppState,
    user_id: Option<Uuid>,
    query: OrderListQuery,
) -> AppResult<ApiResponse<ListData<Order>>> {
    let mut condition = Condition::all().add(OrderCol::DeletedAt.is_null());
    if let Some(user_id) = user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by(
            query.sort_by.unwrap_or_default().column(),
            SortOrder::from_desc(query.desc).as_order(),
        )
        .order_by_asc(OrderCol::Id);

    let (items, meta) =
        fetch_page(finder, Pagination::new(query.page, query.limit), &state.orm).await?;
    let items = items.into_iter().map(order_from_entity).collect();
    Ok(ApiResponse::success("Orders", ListData { items }, Some(meta)))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<ListData<Order>>> {
    ensure_admin(user)?;
    list_orders_for(state, None, query).await
}

fn created_within(range: DateRange) -> AppResult<Condition> {
    let start_of = |day: NaiveDate| day.and_time(NaiveTime::MIN).and_utc();
    let mut condition = Condition::all();
    if let Some(from) = range.from {
        condition = condition.add(OrderCol::CreatedAt.gte(start_of(from)));
    }
    if let Some(to) = range.to {
        let end = to
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::BadRequest("dateRange[to] is out of range".into()))?;
        condition = condition.add(OrderCol::CreatedAt.lt(start_of(end)));
    }
    Ok(condition)
}

struct SummaryQuery {
    condition: Condition,
    pagination: Pagination,
    sort_by: OrderSortBy,
    order: SortOrder,
}

async fn summaries(
    state: &AppState,
    query: SummaryQuery,
) -> AppResult<ApiResponse<ListData<OrderSummary>>> {
    let finder = Orders::find()
        .filter(query.condition)
        .order_by(query.sort_by.column(), query.order.as_order())
        .order_by_asc(OrderCol::Id);
    let (orders, meta) = fetch_page(finder, query.pagination, &state.orm).await?;

    let status_ids: Vec<Uuid> = orders.iter().map(|o| o.order_status_id).collect::<HashSet<_>>().into_iter().collect();
    let user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect::<HashSet<_>>().into_iter().collect();

    let statuses: HashMap<Uuid, StatusModel> = if status_ids.is_empty() {
        HashMap::new()
    } else {
        OrderStatuses::find()
            .filter(StatusCol::Id.is_in(status_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|status| (status.id, status))
            .collect()
    };
    let customers: HashMap<Uuid, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(UserCol::Id.is_in(user_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|user| (user.id, format!("{} {}", user.first_name, user.last_name)))
            .collect()
    };

    let items = orders
        .into_iter()
        .map(|order| OrderSummary {
            uuid: order.id,
            order_status: statuses.get(&order.order_status_id).map(|s| s.title.clone()),
            customer_uuid: order.user_id,
            customer: customers.get(&order.user_id).cloned(),
            products: order_line_items(&order).len(),
            amount: order.amount,
            delivery_fee: order.delivery_fee,
            shipped_at: order.shipped_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: order.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(ApiResponse::success("Orders", ListData { items }, Some(meta)))
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
    query: DashboardQuery,
) -> AppResult<ApiResponse<ListData<OrderSummary>>> {
    ensure_admin(user)?;
    let range = resolve_date_range(
        query.fix_range,
        query.date_from,
        query.date_to,
        Utc::now().date_naive(),
    );
    let condition = Condition::all()
        .add(OrderCol::DeletedAt.is_null())
        .add(created_within(range)?);

    summaries(
        state,
        SummaryQuery {
            condition,
            pagination: Pagination::new(query.page, query.limit),
            sort_by: query.sort_by.unwrap_or_default(),
            order: SortOrder::from_desc(query.desc),
        },
    )
    .await
}

pub async fn shipment_locator(
    state: &AppState,
    user: &AuthUser,
    query: ShipmentLocatorQuery,
) -> AppResult<ApiResponse<ListData<OrderSummary>>> {
    ensure_admin(user)?;
    let range = resolve_date_range(
        query.fix_range,
        query.date_from,
        query.date_to,
        Utc::now().date_naive(),
    );
    let mut condition = Condition::all()
        .add(OrderCol::DeletedAt.is_null())
        .add(OrderCol::ShippedAt.is_not_null())
        .add(created_within(range)?);
    if let Some(order_id) = query.order_uuid {
        condition = condition.add(OrderCol::Id.eq(order_id));
    }
    if let Some(customer_id) = query.customer_uuid {
        condition = condition.add(OrderCol::UserId.eq(customer_id));
    }

    summaries(
        state,
        SummaryQuery {
            condition,
            pagination: Pagination::new(query.page, query.limit),
            sort_by: query.sort_by.unwrap_or(OrderSortBy::ShippedAt),
            order: SortOrder::from_desc(query.desc),
        },
    )
    .await
}

/// Price and store a new order owned by the caller.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: OrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let txn = state.orm.begin().await?;
    ensure_references(&txn, &payload).await?;
    let priced = price_request(&txn, &payload).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        order_status_id: Set(payload.order_status_uuid),
        payment_id: Set(payload.payment_uuid),
        products: Set(line_items_value(&priced)?),
        address: Set(address_value(&payload)?),
        delivery_fee: Set(payload.delivery_fee),
        amount: Set(priced.amount),
        shipped_at: Set(payload.shipped_at.map(|dt| dt.fixed_offset())),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let detail = order_detail(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %detail.order.id,
        user_id = %user.user_id,
        amount = detail.order.amount,
        lines = detail.order.products.len(),
        "order created"
    );
    Ok(ApiResponse::success("Order created", detail, Some(Meta::empty())))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_owned(&state.orm, user, id).await?;
    let detail = order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success("Order", detail, Some(Meta::empty())))
}

/// Replace an order's contents; the total is always re-priced.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: OrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let txn = state.orm.begin().await?;
    let order = find_owned(&txn, user, id).await?;
    ensure_references(&txn, &payload).await?;
    let priced = price_request(&txn, &payload).await?;

    let previous_status = order.order_status_id;
    let mut active: OrderActive = order.into();
    active.order_status_id = Set(payload.order_status_uuid);
    active.payment_id = Set(payload.payment_uuid);
    active.products = Set(line_items_value(&priced)?);
    active.address = Set(address_value(&payload)?);
    active.delivery_fee = Set(payload.delivery_fee);
    active.amount = Set(priced.amount);
    active.shipped_at = Set(payload.shipped_at.map(|dt| dt.fixed_offset()));
    active.updated_at = Set(now());
    let order = active.update(&txn).await?;

    let detail = order_detail(&txn, order).await?;
    txn.commit().await?;

    if previous_status != payload.order_status_uuid {
        tracing::info!(
            order_id = %id,
            from = %previous_status,
            to = %payload.order_status_uuid,
            "order status updated"
        );
    }
    Ok(ApiResponse::success("Order updated", detail, Some(Meta::empty())))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let order = find_owned(&txn, user, id).await?;
    let mut active: OrderActive = order.into();
    active.deleted_at = Set(Some(now()));
    active.update(&txn).await?;
    txn.commit().await?;
    tracing::info!(order_id = %id, "order deleted");
    Ok(ApiResponse::message("Order deleted"))
}

async fn invoice_data(state: &AppState, order: OrderModel) -> AppResult<InvoiceData> {
    let customer = Users::find_by_id(order.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Customer"))?;
    let status = OrderStatuses::find_by_id(order.order_status_id)
        .one(&state.orm)
        .await?
        .map(|status| status.title)
        .unwrap_or_default();

    let payment = match order.payment_id {
        Some(payment_id) => payment_service::find_live(&state.orm, payment_id).await?,
        None => None,
    };
    let payment = match payment {
        Some(payment) => {
            let method = payment_service::find_payment_type(&state.orm, &payment.payment_type)
                .await?
                .map(|kind| kind.title)
                .unwrap_or_else(|| payment.payment_type.clone());
            let details = PaymentDetails::parse(&payment.payment_type, &payment.details)
                .map_err(|err| {
                    tracing::warn!(payment_id = %payment.id, error = %err, "payment details not printable");
                })
                .ok();
            Some(InvoicePayment { method, details })
        }
        None => None,
    };

    Ok(InvoiceData {
        products: order_line_items(&order),
        address: order_address(&order),
        order_id: order.id,
        created_at: order.created_at.with_timezone(&Utc),
        status,
        customer: InvoiceCustomer {
            id: customer.id,
            name: format!("{} {}", customer.first_name, customer.last_name),
            phone: customer.phone_number,
            email: customer.email,
            address: customer.address,
        },
        payment,
        delivery_fee: order.delivery_fee.unwrap_or(0),
        amount: order.amount,
    })
}

/// Render the invoice, store it, and return `(file name, pdf bytes)`.
pub async fn download_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<(String, Vec<u8>)> {
    let order = find_owned(&state.orm, user, id).await?;
    let data = invoice_data(state, order).await?;

    let pdf = tokio::task::spawn_blocking(move || invoice::render_pdf(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invoice task failed: {e}")))??;

    let path = invoice::invoice_path(id);
    state.storage.write(&path, pdf).await?;
    if !state.storage.exists(&path).await? {
        tracing::warn!(order_id = %id, path = %path, "invoice missing after write");
        return Err(AppError::MissingBlob);
    }
    let bytes = state.storage.read(&path).await?;

    tracing::info!(order_id = %id, size = bytes.len(), "invoice generated");
    Ok((format!("{id}.pdf"), bytes))
}
