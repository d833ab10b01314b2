use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Body for categories, brands and order statuses.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TaxonomyRequest {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub slug: String,
}
