//! Categories, brands and order statuses share one table shape (`id`, `title`,
//! unique `slug`, timestamps, soft delete) and one set of rules, so their
//! services are generated from a single definition.

macro_rules! taxonomy_service {
    ($module:ident, $entity:ident, $to_model:ident, $resource:literal, $plural:literal) => {
        pub mod $module {
            use sea_orm::ActiveValue::NotSet;
            use sea_orm::{
                ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
                QueryOrder, Set, TransactionTrait,
            };
            use uuid::Uuid;

            use crate::{
                dto::catalog::TaxonomyRequest,
                entity::$entity::{ActiveModel, Column, Entity, Model},
                error::{AppError, AppResult},
                middleware::auth::{AuthUser, ensure_admin},
                models::{Taxonomy, $to_model},
                response::{ApiResponse, ListData, Meta},
                routes::params::{ListQuery, Pagination, SortOrder, TaxonomySortBy},
                services::{fetch_page, now},
                state::AppState,
            };

            const RESOURCE: &str = $resource;

            fn sort_column(sort_by: TaxonomySortBy) -> Column {
                match sort_by {
                    TaxonomySortBy::CreatedAt => Column::CreatedAt,
                    TaxonomySortBy::UpdatedAt => Column::UpdatedAt,
                    TaxonomySortBy::Title => Column::Title,
                    TaxonomySortBy::Slug => Column::Slug,
                }
            }

            pub(crate) async fn find_live<C: ConnectionTrait>(
                conn: &C,
                id: Uuid,
            ) -> AppResult<Option<Model>> {
                Ok(Entity::find_by_id(id)
                    .filter(Column::DeletedAt.is_null())
                    .one(conn)
                    .await?)
            }

            // Soft-deleted rows keep their slug reserved.
            async fn ensure_slug_free<C: ConnectionTrait>(
                conn: &C,
                slug: &str,
                except: Option<Uuid>,
            ) -> AppResult<()> {
                let existing = Entity::find().filter(Column::Slug.eq(slug)).one(conn).await?;
                match existing {
                    Some(row) if Some(row.id) != except => {
                        Err(AppError::BadRequest(format!("Slug {slug} is already in use")))
                    }
                    _ => Ok(()),
                }
            }

            pub async fn list(
                state: &AppState,
                query: ListQuery,
            ) -> AppResult<ApiResponse<ListData<Taxonomy>>> {
                let finder = Entity::find()
                    .filter(Column::DeletedAt.is_null())
                    .order_by(
                        sort_column(query.sort_by.unwrap_or_default()),
                        SortOrder::from_desc(query.desc).as_order(),
                    )
                    .order_by_asc(Column::Id);

                let (items, meta) =
                    fetch_page(finder, Pagination::new(query.page, query.limit), &state.orm)
                        .await?;
                let items = items.into_iter().map($to_model).collect();
                Ok(ApiResponse::success($plural, ListData { items }, Some(meta)))
            }

            pub async fn get(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Taxonomy>> {
                let row = find_live(&state.orm, id)
                    .await?
                    .ok_or(AppError::NotFound(RESOURCE))?;
                Ok(ApiResponse::success(RESOURCE, $to_model(row), Some(Meta::empty())))
            }

            pub async fn create(
                state: &AppState,
                user: &AuthUser,
                payload: TaxonomyRequest,
            ) -> AppResult<ApiResponse<Taxonomy>> {
                ensure_admin(user)?;
                let txn = state.orm.begin().await?;
                ensure_slug_free(&txn, &payload.slug, None).await?;

                let row = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    title: Set(payload.title),
                    slug: Set(payload.slug),
                    created_at: NotSet,
                    updated_at: NotSet,
                    deleted_at: Set(None),
                }
                .insert(&txn)
                .await?;
                txn.commit().await?;

                Ok(ApiResponse::success(
                    concat!($resource, " created"),
                    $to_model(row),
                    Some(Meta::empty()),
                ))
            }

            pub async fn update(
                state: &AppState,
                user: &AuthUser,
                id: Uuid,
                payload: TaxonomyRequest,
            ) -> AppResult<ApiResponse<Taxonomy>> {
                ensure_admin(user)?;
                let txn = state.orm.begin().await?;
                let row = find_live(&txn, id).await?.ok_or(AppError::NotFound(RESOURCE))?;
                ensure_slug_free(&txn, &payload.slug, Some(row.id)).await?;

                let mut active: ActiveModel = row.into();
                active.title = Set(payload.title);
                active.slug = Set(payload.slug);
                active.updated_at = Set(now());
                let row = active.update(&txn).await?;
                txn.commit().await?;

                Ok(ApiResponse::success(
                    concat!($resource, " updated"),
                    $to_model(row),
                    Some(Meta::empty()),
                ))
            }

            pub async fn delete(
                state: &AppState,
                user: &AuthUser,
                id: Uuid,
            ) -> AppResult<ApiResponse<serde_json::Value>> {
                ensure_admin(user)?;
                let txn = state.orm.begin().await?;
                let row = find_live(&txn, id).await?.ok_or(AppError::NotFound(RESOURCE))?;

                let mut active: ActiveModel = row.into();
                active.deleted_at = Set(Some(now()));
                active.update(&txn).await?;
                txn.commit().await?;

                Ok(ApiResponse::message(concat!($resource, " deleted")))
            }
        }
    };
}

taxonomy_service!(category_service, categories, category_from_entity, "Category", "Categories");
taxonomy_service!(brand_service, brands, brand_from_entity, "Brand", "Brands");
taxonomy_service!(
    order_status_service,
    order_statuses,
    order_status_from_entity,
    "Order status",
    "Order statuses"
);
