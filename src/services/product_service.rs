use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::products::ProductRequest,
    entity::products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, product_from_entity},
    response::{ApiResponse, ListData, Meta},
    routes::params::{Pagination, ProductQuery, SortOrder},
    services::{brand_service, category_service, fetch_page, now},
    state::AppState,
};

pub(crate) async fn find_live<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<ProductModel>> {
    Ok(Products::find_by_id(id)
        .filter(ProdCol::DeletedAt.is_null())
        .one(conn)
        .await?)
}

pub(crate) async fn find_live_many<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> AppResult<Vec<ProductModel>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .filter(ProdCol::DeletedAt.is_null())
        .all(conn)
        .await?)
}

async fn ensure_references<C: ConnectionTrait>(conn: &C, payload: &ProductRequest) -> AppResult<()> {
    if category_service::find_live(conn, payload.category_uuid).await?.is_none() {
        return Err(AppError::Unprocessable("Category does not exist".into()));
    }
    if brand_service::find_live(conn, payload.brand_uuid).await?.is_none() {
        return Err(AppError::Unprocessable("Brand does not exist".into()));
    }
    Ok(())
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ListData<Product>>> {
    let mut condition = Condition::all().add(ProdCol::DeletedAt.is_null());
    if let Some(title) = query.title.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(ProdCol::Title.contains(title));
    }
    if let Some(price) = query.price {
        condition = condition.add(ProdCol::Price.lte(price));
    }
    if let Some(brand) = query.brand {
        condition = condition.add(ProdCol::BrandId.eq(brand));
    }
    if let Some(category) = query.category {
        condition = condition.add(ProdCol::CategoryId.eq(category));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by(
            query.sort_by.unwrap_or_default().column(),
            SortOrder::from_desc(query.desc).as_order(),
        )
        .order_by_asc(ProdCol::Id);

    let (items, meta) =
        fetch_page(finder, Pagination::new(query.page, query.limit), &state.orm).await?;
    let items = items.into_iter().map(product_from_entity).collect();
    Ok(ApiResponse::success("Products", ListData { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = find_live(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(ApiResponse::success("Product", product_from_entity(product), Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    ensure_references(&txn, &payload).await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_uuid),
        brand_id: Set(payload.brand_uuid),
        title: Set(payload.title),
        price: Set(payload.price),
        description: Set(payload.description),
        metadata: Set(Value::Object(payload.metadata.unwrap_or_default())),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Product created", product_from_entity(product), Some(Meta::empty())))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let product = find_live(&txn, id).await?.ok_or(AppError::NotFound("Product"))?;
    ensure_references(&txn, &payload).await?;

    let mut active: ProductActive = product.into();
    active.category_id = Set(payload.category_uuid);
    active.brand_id = Set(payload.brand_uuid);
    active.title = Set(payload.title);
    active.price = Set(payload.price);
    active.description = Set(payload.description);
    if let Some(metadata) = payload.metadata {
        active.metadata = Set(Value::Object(metadata));
    }
    active.updated_at = Set(now());
    let product = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Product updated", product_from_entity(product), Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let product = find_live(&txn, id).await?.ok_or(AppError::NotFound("Product"))?;
    let mut active: ProductActive = product.into();
    active.deleted_at = Set(Some(now()));
    active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::message("Product deleted"))
}
