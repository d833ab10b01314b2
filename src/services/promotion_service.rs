use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, SimpleExpr};
use uuid::Uuid;

use crate::{
    dto::content::PromotionRequest,
    entity::promotions::{ActiveModel as PromotionActive, Column as PromotionCol, Entity as Promotions},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Promotion, promotion_from_entity},
    response::{ApiResponse, ListData, Meta},
    routes::params::{Pagination, PromotionQuery, SortOrder},
    services::{fetch_page, now},
    state::AppState,
};

/// `valid_from <= day <= valid_to`, on the ISO dates stored in metadata.
fn running_on(day: NaiveDate) -> Condition {
    let day = day.format("%Y-%m-%d").to_string();
    let starts: SimpleExpr = Expr::cust_with_values("(metadata->>'valid_from') <= ?", [day.clone()]);
    let ends: SimpleExpr = Expr::cust_with_values("(metadata->>'valid_to') >= ?", [day]);
    Condition::all().add(starts).add(ends)
}

pub async fn list_promotions(
    state: &AppState,
    query: PromotionQuery,
) -> AppResult<ApiResponse<ListData<Promotion>>> {
    let mut condition = Condition::all().add(PromotionCol::DeletedAt.is_null());
    if query.valid.unwrap_or(true) {
        condition = condition.add(running_on(Utc::now().date_naive()));
    }

    let finder = Promotions::find()
        .filter(condition)
        .order_by(
            query.sort_by.unwrap_or_default().promotion_column(),
            SortOrder::from_desc(query.desc).as_order(),
        )
        .order_by_asc(PromotionCol::Id);

    let (items, meta) =
        fetch_page(finder, Pagination::new(query.page, query.limit), &state.orm).await?;
    let items = items.into_iter().map(promotion_from_entity).collect();
    Ok(ApiResponse::success("Promotions", ListData { items }, Some(meta)))
}

fn metadata_value(payload: &PromotionRequest) -> AppResult<serde_json::Value> {
    serde_json::to_value(&payload.metadata)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode promotion metadata: {e}")))
}

pub async fn create_promotion(
    state: &AppState,
    user: &AuthUser,
    payload: PromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_admin(user)?;
    let metadata = metadata_value(&payload)?;
    let promotion = PromotionActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        content: Set(payload.content),
        metadata: Set(metadata),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::success(
        "Promotion created",
        promotion_from_entity(promotion),
        Some(Meta::empty()),
    ))
}

pub async fn update_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_admin(user)?;
    let metadata = metadata_value(&payload)?;
    let txn = state.orm.begin().await?;
    let promotion = Promotions::find_by_id(id)
        .filter(PromotionCol::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Promotion"))?;

    let mut active: PromotionActive = promotion.into();
    active.title = Set(payload.title);
    active.content = Set(payload.content);
    active.metadata = Set(metadata);
    active.updated_at = Set(now());
    let promotion = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Promotion updated",
        promotion_from_entity(promotion),
        Some(Meta::empty()),
    ))
}

pub async fn delete_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let promotion = Promotions::find_by_id(id)
        .filter(PromotionCol::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Promotion"))?;
    let mut active: PromotionActive = promotion.into();
    active.deleted_at = Set(Some(now()));
    active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::message("Promotion deleted"))
}
