//! Database models and DTOs for users, products, and validation history.

pub mod history;
pub mod page;
pub mod product;
pub mod user;
pub mod validation;
