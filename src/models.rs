use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::payments::redact_details,
    entity::{
        brands, categories, files, order_statuses, orders, payments, posts,
        products, promotions, users,
    },
    pricing::LineItem,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub avatar: Option<Uuid>,
    pub address: String,
    pub phone_number: String,
    pub is_marketing: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shape shared by categories, brands and order statuses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Taxonomy {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub title: String,
    pub price: i64,
    pub description: String,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub payment_type: String,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    #[schema(value_type = Option<Object>)]
    pub response_status: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct OrderAddress {
    #[validate(length(min = 1, max = 255))]
    pub billing: String,
    #[validate(length(min = 1, max = 255))]
    pub shipping: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_status_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub products: Vec<LineItem>,
    pub address: OrderAddress,
    pub delivery_fee: Option<i64>,
    pub amount: i64,
    pub shipped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct File {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub size: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Promotion {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        is_admin: model.is_admin,
        email: model.email,
        email_verified_at: model.email_verified_at.map(|dt| dt.with_timezone(&Utc)),
        avatar: model.avatar,
        address: model.address,
        phone_number: model.phone_number,
        is_marketing: model.is_marketing,
        last_login_at: model.last_login_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

macro_rules! taxonomy_from_entity {
    ($name:ident, $module:ident) => {
        pub fn $name(model: $module::Model) -> Taxonomy {
            Taxonomy {
                id: model.id,
                title: model.title,
                slug: model.slug,
                created_at: model.created_at.with_timezone(&Utc),
                updated_at: model.updated_at.with_timezone(&Utc),
            }
        }
    };
}

taxonomy_from_entity!(category_from_entity, categories);
taxonomy_from_entity!(brand_from_entity, brands);
taxonomy_from_entity!(order_status_from_entity, order_statuses);

pub fn product_from_entity(model: products::Model) -> Product {
    Product {
        id: model.id,
        category_id: model.category_id,
        brand_id: model.brand_id,
        title: model.title,
        price: model.price,
        description: model.description,
        metadata: model.metadata,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn payment_from_entity(model: payments::Model) -> Payment {
    Payment {
        id: model.id,
        details: redact_details(&model.payment_type, &model.details),
        payment_type: model.payment_type,
        response_status: model.response_status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Decode the JSON columns of an order row.
pub fn order_line_items(model: &orders::Model) -> Vec<LineItem> {
    serde_json::from_value(model.products.clone()).unwrap_or_else(|err| {
        tracing::warn!(order_id = %model.id, error = %err, "order has malformed line items");
        Vec::new()
    })
}

pub fn order_address(model: &orders::Model) -> OrderAddress {
    serde_json::from_value(model.address.clone()).unwrap_or_else(|err| {
        tracing::warn!(order_id = %model.id, error = %err, "order has malformed address");
        OrderAddress {
            billing: String::new(),
            shipping: String::new(),
        }
    })
}

pub fn order_from_entity(model: orders::Model) -> Order {
    Order {
        products: order_line_items(&model),
        address: order_address(&model),
        id: model.id,
        user_id: model.user_id,
        order_status_id: model.order_status_id,
        payment_id: model.payment_id,
        delivery_fee: model.delivery_fee,
        amount: model.amount,
        shipped_at: model.shipped_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn file_from_entity(model: files::Model) -> File {
    File {
        id: model.id,
        name: model.name,
        path: model.path,
        size: model.size,
        mime_type: model.mime_type,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn post_from_entity(model: posts::Model) -> Post {
    Post {
        id: model.id,
        title: model.title,
        slug: model.slug,
        content: model.content,
        metadata: model.metadata,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn promotion_from_entity(model: promotions::Model) -> Promotion {
    Promotion {
        id: model.id,
        title: model.title,
        content: model.content,
        metadata: model.metadata,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
