use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::content::PostRequest,
    entity::posts::{ActiveModel as PostActive, Column as PostCol, Entity as Posts},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Post, post_from_entity},
    response::{ApiResponse, ListData, Meta},
    routes::params::{ContentQuery, Pagination, SortOrder},
    services::{fetch_page, now},
    state::AppState,
};

pub async fn list_posts(
    state: &AppState,
    query: ContentQuery,
) -> AppResult<ApiResponse<ListData<Post>>> {
    let finder = Posts::find()
        .filter(PostCol::DeletedAt.is_null())
        .order_by(
            query.sort_by.unwrap_or_default().post_column(),
            SortOrder::from_desc(query.desc).as_order(),
        )
        .order_by_asc(PostCol::Id);

    let (items, meta) =
        fetch_page(finder, Pagination::new(query.page, query.limit), &state.orm).await?;
    let items = items.into_iter().map(post_from_entity).collect();
    Ok(ApiResponse::success("Posts", ListData { items }, Some(meta)))
}

pub async fn get_post(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Post>> {
    let post = Posts::find_by_id(id)
        .filter(PostCol::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    Ok(ApiResponse::success("Post", post_from_entity(post), Some(Meta::empty())))
}

pub async fn create_post(
    state: &AppState,
    user: &AuthUser,
    payload: PostRequest,
) -> AppResult<ApiResponse<Post>> {
    ensure_admin(user)?;
    let post = PostActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        slug: Set(payload.slug),
        content: Set(payload.content),
        metadata: Set(Value::Object(payload.metadata.unwrap_or_default())),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::success("Post created", post_from_entity(post), Some(Meta::empty())))
}

pub async fn update_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PostRequest,
) -> AppResult<ApiResponse<Post>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let post = Posts::find_by_id(id)
        .filter(PostCol::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Post"))?;

    let mut active: PostActive = post.into();
    active.title = Set(payload.title);
    active.slug = Set(payload.slug);
    active.content = Set(payload.content);
    if let Some(metadata) = payload.metadata {
        active.metadata = Set(Value::Object(metadata));
    }
    active.updated_at = Set(now());
    let post = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Post updated", post_from_entity(post), Some(Meta::empty())))
}

pub async fn delete_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let post = Posts::find_by_id(id)
        .filter(PostCol::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    let mut active: PostActive = post.into();
    active.deleted_at = Set(Some(now()));
    active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::message("Post deleted"))
}
