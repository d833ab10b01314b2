//! Route modules for categories, brands and order statuses. The handlers only
//! differ in paths, names and OpenAPI text, so one definition generates all three.

macro_rules! taxonomy_routes {
    (
        mod $module:ident,
        service: $service:ident,
        tag: $tag:tt,
        collection: $collection:tt => $list:ident,
        create: $create_route:tt => $create:ident,
        item: $item_route:tt => $get:ident, $update:ident, $delete:ident,
        docs: {
            list: $list_api:tt,
            create: $create_api:tt,
            item: $item_api:tt,
            id: $id_text:tt,
            not_found: $not_found:tt $(,)?
        } $(,)?
    ) => {
        pub mod $module {
            use axum::{
                Json, Router,
                extract::{Path, Query, State},
                http::StatusCode,
                routing::{get, post},
            };
            use uuid::Uuid;

            use crate::{
                dto::catalog::TaxonomyRequest,
                error::AppResult,
                extract::ValidatedJson,
                middleware::auth::AuthUser,
                models::Taxonomy,
                response::{ApiResponse, ListData},
                routes::params::ListQuery,
                services::$service,
                state::AppState,
            };

            pub fn router() -> Router<AppState> {
                Router::new()
                    .route($collection, get($list))
                    .route($create_route, post($create))
                    .route($item_route, get($get).put($update).delete($delete))
            }

            #[utoipa::path(
                get,
                path = $list_api,
                params(ListQuery),
                responses((status = 200, description = "Listing", body = ApiResponse<ListData<Taxonomy>>)),
                tag = $tag
            )]
            pub async fn $list(
                State(state): State<AppState>,
                Query(query): Query<ListQuery>,
            ) -> AppResult<Json<ApiResponse<ListData<Taxonomy>>>> {
                let resp = $service::list(&state, query).await?;
                Ok(Json(resp))
            }

            #[utoipa::path(
                get,
                path = $item_api,
                params(("uuid" = Uuid, Path, description = $id_text)),
                responses(
                    (status = 200, description = "Entry", body = ApiResponse<Taxonomy>),
                    (status = 404, description = $not_found),
                ),
                tag = $tag
            )]
            pub async fn $get(
                State(state): State<AppState>,
                Path(uuid): Path<Uuid>,
            ) -> AppResult<Json<ApiResponse<Taxonomy>>> {
                let resp = $service::get(&state, uuid).await?;
                Ok(Json(resp))
            }

            #[utoipa::path(
                post,
                path = $create_api,
                request_body = TaxonomyRequest,
                responses(
                    (status = 201, description = "Created", body = ApiResponse<Taxonomy>),
                    (status = 400, description = "Slug already in use"),
                    (status = 403, description = "Forbidden"),
                ),
                security(("bearer_auth" = [])),
                tag = $tag
            )]
            pub async fn $create(
                State(state): State<AppState>,
                user: AuthUser,
                ValidatedJson(payload): ValidatedJson<TaxonomyRequest>,
            ) -> AppResult<(StatusCode, Json<ApiResponse<Taxonomy>>)> {
                let resp = $service::create(&state, &user, payload).await?;
                Ok((StatusCode::CREATED, Json(resp)))
            }

            #[utoipa::path(
                put,
                path = $item_api,
                params(("uuid" = Uuid, Path, description = $id_text)),
                request_body = TaxonomyRequest,
                responses(
                    (status = 200, description = "Updated", body = ApiResponse<Taxonomy>),
                    (status = 400, description = "Slug already in use"),
                    (status = 403, description = "Forbidden"),
                    (status = 404, description = $not_found),
                ),
                security(("bearer_auth" = [])),
                tag = $tag
            )]
            pub async fn $update(
                State(state): State<AppState>,
                user: AuthUser,
                Path(uuid): Path<Uuid>,
                ValidatedJson(payload): ValidatedJson<TaxonomyRequest>,
            ) -> AppResult<Json<ApiResponse<Taxonomy>>> {
                let resp = $service::update(&state, &user, uuid, payload).await?;
                Ok(Json(resp))
            }

            #[utoipa::path(
                delete,
                path = $item_api,
                params(("uuid" = Uuid, Path, description = $id_text)),
                responses(
                    (status = 200, description = "Deleted"),
                    (status = 403, description = "Forbidden"),
                    (status = 404, description = $not_found),
                ),
                security(("bearer_auth" = [])),
                tag = $tag
            )]
            pub async fn $delete(
                State(state): State<AppState>,
                user: AuthUser,
                Path(uuid): Path<Uuid>,
            ) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
                let resp = $service::delete(&state, &user, uuid).await?;
                Ok(Json(resp))
            }
        }
    };
}

taxonomy_routes! {
    mod categories,
    service: category_service,
    tag: "Categories",
    collection: "/categories" => list_categories,
    create: "/category/create" => create_category,
    item: "/category/{uuid}" => get_category, update_category, delete_category,
    docs: {
        list: "/api/v1/categories",
        create: "/api/v1/category/create",
        item: "/api/v1/category/{uuid}",
        id: "Category ID",
        not_found: "Category not found",
    },
}

taxonomy_routes! {
    mod brands,
    service: brand_service,
    tag: "Brands",
    collection: "/brands" => list_brands,
    create: "/brand/create" => create_brand,
    item: "/brand/{uuid}" => get_brand, update_brand, delete_brand,
    docs: {
        list: "/api/v1/brands",
        create: "/api/v1/brand/create",
        item: "/api/v1/brand/{uuid}",
        id: "Brand ID",
        not_found: "Brand not found",
    },
}

taxonomy_routes! {
    mod order_statuses,
    service: order_status_service,
    tag: "Order Statuses",
    collection: "/order-statuses" => list_order_statuses,
    create: "/order-status/create" => create_order_status,
    item: "/order-status/{uuid}" => get_order_status, update_order_status, delete_order_status,
    docs: {
        list: "/api/v1/order-statuses",
        create: "/api/v1/order-status/create",
        item: "/api/v1/order-status/{uuid}",
        id: "Order status ID",
        not_found: "Order status not found",
    },
}
