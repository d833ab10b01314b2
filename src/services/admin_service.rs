use chrono::{Days, NaiveTime};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::auth::UpdateUserRequest,
    entity::users::{Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{User, user_from_entity},
    response::{ApiResponse, ListData},
    routes::params::{Pagination, SortOrder, UserListingQuery},
    services::{fetch_page, user_service},
    state::AppState,
};

/// Customers only; admin accounts are never listed.
pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListingQuery,
) -> AppResult<ApiResponse<ListData<User>>> {
    ensure_admin(user)?;

    let mut condition = Condition::all()
        .add(UserCol::IsAdmin.eq(false))
        .add(UserCol::DeletedAt.is_null());
    if let Some(first_name) = query.first_name.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(UserCol::FirstName.contains(first_name));
    }
    if let Some(email) = query.email.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(UserCol::Email.contains(email));
    }
    if let Some(phone) = query.phone.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(UserCol::PhoneNumber.contains(phone));
    }
    if let Some(address) = query.address.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(UserCol::Address.contains(address));
    }
    if let Some(marketing) = query.marketing {
        condition = condition.add(UserCol::IsMarketing.eq(marketing));
    }
    if let Some(day) = query.created_at {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::BadRequest("created_at is out of range".into()))?
            .and_time(NaiveTime::MIN)
            .and_utc();
        condition = condition
            .add(UserCol::CreatedAt.gte(start))
            .add(UserCol::CreatedAt.lt(end));
    }

    let sort_by = query.sort_by.unwrap_or_default();
    let finder = Users::find()
        .filter(condition)
        .order_by(sort_by.column(), SortOrder::from_desc(query.desc).as_order())
        .order_by_asc(UserCol::Id);

    let (items, meta) =
        fetch_page(finder, Pagination::new(query.page, query.limit), &state.orm).await?;
    let items = items.into_iter().map(user_from_entity).collect();

    Ok(ApiResponse::success("Users", ListData { items }, Some(meta)))
}

pub async fn edit_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    ensure_not_admin_account(state, id).await?;
    user_service::update_user(state, id, payload).await
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    ensure_not_admin_account(state, id).await?;
    user_service::soft_delete_user(state, id).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// Admin accounts are managed by their owners only.
async fn ensure_not_admin_account(state: &AppState, id: Uuid) -> AppResult<()> {
    let target = user_service::find_live_user(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    if target.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}
