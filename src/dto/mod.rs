pub mod auth;
pub mod catalog;
pub mod content;
pub mod orders;
pub mod payments;
pub mod products;
