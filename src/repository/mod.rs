//! Storage interface for users, products, and validation history.
//!
//! Services depend on these traits only. `PgRepository` is the production
//! backend; `MemoryRepository` keeps everything in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::ValidationRecord;
use crate::models::product::Product;
use crate::models::user::{NewUser, User};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A duplicate username is a `Conflict`.
    async fn create_user(&self, input: &NewUser) -> Result<User, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Newest first. `search` matches product name or batch format, case-insensitively.
    async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, AppError>;
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError>;
    /// Exact barcode match, newest product wins. An empty barcode never matches.
    async fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<Product>, AppError>;
    async fn insert_product(&self, product: &Product) -> Result<Product, AppError>;
    /// Replace the stored product with the same id. `None` if it does not exist.
    async fn update_product(&self, product: &Product) -> Result<Option<Product>, AppError>;
    /// Returns whether a product was removed.
    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append_record(&self, record: &ValidationRecord) -> Result<ValidationRecord, AppError>;
    /// Newest first, optionally restricted to one user. Returns the page and the total count.
    async fn list_records(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ValidationRecord>, i64), AppError>;
}

/// Full storage backend shared through `AppState`.
#[async_trait]
pub trait Repository: UserRepository + ProductRepository + HistoryRepository {
    /// Readiness check for the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}
