use sea_orm::{
    DatabaseConnection, EntityTrait, PaginatorTrait, QuerySelect, Select, prelude::DateTimeWithTimeZone,
};

use crate::{error::AppResult, response::Meta, routes::params::Pagination};

pub mod admin_service;
pub mod file_service;
pub mod order_service;
pub mod password;
pub mod payment_service;
pub mod post_service;
pub mod product_service;
pub mod promotion_service;
pub mod user_service;
mod taxonomy;

pub use taxonomy::{brand_service, category_service, order_status_service};

/// Count the full result set, then fetch the requested page of it.
pub(crate) async fn fetch_page<E>(
    finder: Select<E>,
    pagination: Pagination,
    db: &DatabaseConnection,
) -> AppResult<(Vec<E::Model>, Meta)>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let (page, per_page, offset) = pagination.normalize();
    let total = finder.clone().count(db).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(db)
        .await?;
    Ok((items, Meta::new(page, per_page, total)))
}

pub(crate) fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().fixed_offset()
}
