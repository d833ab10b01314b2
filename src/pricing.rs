//! Turns requested `(product, quantity)` pairs into priced line items.
//!
//! Prices and titles are snapshotted from the product rows at the time of
//! pricing so later catalog edits never change an existing order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entity::products::Model as ProductModel,
    error::{AppError, AppResult},
};

/// Largest unit price or delivery fee accepted, in minor units.
pub const MAX_PRICE: i64 = 100_000_000_000;
/// Largest quantity accepted on one line.
pub const MAX_QUANTITY: i64 = 100_000;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct LineItemRequest {
    /// Product id.
    pub uuid: Uuid,
    #[validate(range(min = 1, max = MAX_QUANTITY))]
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct LineItem {
    /// Product id.
    pub uuid: Uuid,
    pub title: String,
    /// Unit price in minor units at the time of pricing.
    pub price: i64,
    pub quantity: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub products: Vec<LineItem>,
    pub amount: i64,
}

fn total_too_large() -> AppError {
    AppError::BadRequest("Order total is too large".into())
}

/// Price `requests` against `catalog`. Unknown products are skipped; a total
/// that does not fit in an `i64` is refused.
pub fn price_line_items(
    requests: &[LineItemRequest],
    catalog: &HashMap<Uuid, ProductModel>,
) -> AppResult<PricedOrder> {
    let mut products = Vec::with_capacity(requests.len());
    let mut amount = 0_i64;

    for request in requests {
        let Some(product) = catalog.get(&request.uuid) else {
            tracing::warn!(product_id = %request.uuid, "skipping unknown product in order");
            continue;
        };
        let line_amount = product
            .price
            .checked_mul(request.quantity)
            .ok_or_else(total_too_large)?;
        amount = amount.checked_add(line_amount).ok_or_else(total_too_large)?;
        products.push(LineItem {
            uuid: product.id,
            title: product.title.clone(),
            price: product.price,
            quantity: request.quantity,
            amount: line_amount,
        });
    }

    Ok(PricedOrder { products, amount })
}

/// Format minor units as `12.34`.
pub fn format_money(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
