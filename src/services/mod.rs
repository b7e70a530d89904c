//! Business logic services.

pub mod auth;
pub mod batch_format;
pub mod extraction;
pub mod history;
pub mod product;
pub mod validation;
