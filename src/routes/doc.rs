use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
            ResetPasswordRequest, UpdateUserRequest, UserRequest, UserWithToken,
        },
        catalog::TaxonomyRequest,
        content::{PostRequest, PromotionMetadata, PromotionRequest},
        orders::{OrderDetail, OrderRequest, OrderSummary},
        payments::PaymentRequest,
        products::ProductRequest,
    },
    models::{File, Order, OrderAddress, Payment, Post, Product, Promotion, Taxonomy, User},
    pricing::{LineItem, LineItemRequest},
    response::{ApiResponse, ListData, Meta},
    routes::{
        admin, brands, categories, files, health, main_page, order_statuses, orders, params,
        payments, products, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::create_user,
        users::login,
        users::logout,
        users::profile,
        users::edit_profile,
        users::delete_account,
        users::forgot_password,
        users::reset_password,
        users::my_orders,
        admin::create_admin,
        admin::login,
        admin::logout,
        admin::list_users,
        admin::edit_user,
        admin::delete_user,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        brands::list_brands,
        brands::get_brand,
        brands::create_brand,
        brands::update_brand,
        brands::delete_brand,
        order_statuses::list_order_statuses,
        order_statuses::get_order_status,
        order_statuses::create_order_status,
        order_statuses::update_order_status,
        order_statuses::delete_order_status,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        payments::list_payments,
        payments::get_payment,
        payments::create_payment,
        payments::update_payment,
        payments::delete_payment,
        files::upload_file,
        files::download_file,
        main_page::list_posts,
        main_page::get_post,
        main_page::create_post,
        main_page::update_post,
        main_page::delete_post,
        main_page::list_promotions,
        main_page::create_promotion,
        main_page::update_promotion,
        main_page::delete_promotion,
        orders::list_orders,
        orders::dashboard,
        orders::shipment_locator,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::download_invoice,
        orders::payment_callback
    ),
    components(
        schemas(
            User,
            Taxonomy,
            Product,
            Payment,
            Order,
            OrderAddress,
            File,
            Post,
            Promotion,
            LineItem,
            LineItemRequest,
            UserRequest,
            UpdateUserRequest,
            LoginRequest,
            LoginResponse,
            UserWithToken,
            ForgotPasswordRequest,
            ForgotPasswordResponse,
            ResetPasswordRequest,
            TaxonomyRequest,
            ProductRequest,
            PaymentRequest,
            PostRequest,
            PromotionMetadata,
            PromotionRequest,
            OrderRequest,
            OrderDetail,
            OrderSummary,
            params::TaxonomySortBy,
            params::ProductSortBy,
            params::OrderSortBy,
            params::UserSortBy,
            params::PaymentSortBy,
            params::ContentSortBy,
            params::FixRange,
            health::HealthData,
            Meta,
            ApiResponse<User>,
            ApiResponse<Product>,
            ApiResponse<OrderDetail>,
            ApiResponse<ListData<Order>>,
            ApiResponse<ListData<Product>>,
            ApiResponse<ListData<OrderSummary>>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "User", description = "Customer account endpoints"),
        (name = "Admin", description = "Admin account and user management endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Brands", description = "Brand endpoints"),
        (name = "Order Statuses", description = "Order status endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Payments", description = "Payment endpoints"),
        (name = "File", description = "File upload and download endpoints"),
        (name = "MainPage", description = "Blog posts and promotions"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
