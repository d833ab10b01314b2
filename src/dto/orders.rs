use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{Order, OrderAddress, Payment, Taxonomy},
    pricing::{LineItemRequest, MAX_PRICE},
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OrderRequest {
    pub order_status_uuid: Uuid,
    pub payment_uuid: Option<Uuid>,
    /// Minor units.
    #[validate(range(min = 0, max = MAX_PRICE))]
    pub delivery_fee: Option<i64>,
    #[validate(length(min = 1), nested)]
    pub products: Vec<LineItemRequest>,
    #[validate(nested)]
    pub address: OrderAddress,
    pub shipped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub order_status: Option<Taxonomy>,
    pub payment: Option<Payment>,
}

/// Row of the dashboard and shipment locator listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummary {
    pub uuid: Uuid,
    pub order_status: Option<String>,
    pub customer_uuid: Uuid,
    pub customer: Option<String>,
    pub products: usize,
    pub amount: i64,
    pub delivery_fee: Option<i64>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_needs_products_and_an_address() {
        let request: OrderRequest = serde_json::from_value(serde_json::json!({
            "order_status_uuid": Uuid::new_v4(),
            "products": [],
            "address": { "billing": "", "shipping": "1 Dog Lane" }
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let errors = errors.errors();
        assert!(errors.contains_key("products"));
        assert!(errors.contains_key("address"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let request: OrderRequest = serde_json::from_value(serde_json::json!({
            "order_status_uuid": Uuid::new_v4(),
            "products": [{ "uuid": Uuid::new_v4(), "quantity": 0 }],
            "address": { "billing": "1 Dog Lane", "shipping": "1 Dog Lane" }
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn delivery_fee_is_bounded() {
        let request: OrderRequest = serde_json::from_value(serde_json::json!({
            "order_status_uuid": Uuid::new_v4(),
            "delivery_fee": i64::MAX,
            "products": [{ "uuid": Uuid::new_v4(), "quantity": 1 }],
            "address": { "billing": "1 Dog Lane", "shipping": "1 Dog Lane" }
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("delivery_fee"));
    }
}
