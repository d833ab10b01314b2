use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::pricing::MAX_PRICE;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ProductRequest {
    pub category_uuid: Uuid,
    pub brand_uuid: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Minor units.
    #[validate(range(min = 0, max = MAX_PRICE))]
    pub price: i64,
    #[validate(length(min = 1))]
    pub description: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
}
