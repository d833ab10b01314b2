pub mod brands;
pub mod categories;
pub mod files;
pub mod jwt_tokens;
pub mod order_statuses;
pub mod orders;
pub mod password_resets;
pub mod payment_types;
pub mod payments;
pub mod posts;
pub mod products;
pub mod promotions;
pub mod users;

pub use brands::Entity as Brands;
pub use categories::Entity as Categories;
pub use files::Entity as Files;
pub use jwt_tokens::Entity as JwtTokens;
pub use order_statuses::Entity as OrderStatuses;
pub use orders::Entity as Orders;
pub use password_resets::Entity as PasswordResets;
pub use payment_types::Entity as PaymentTypes;
pub use payments::Entity as Payments;
pub use posts::Entity as Posts;
pub use products::Entity as Products;
pub use promotions::Entity as Promotions;
pub use users::Entity as Users;
