//! In-process repository. Tables live in vectors ordered newest first.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{HistoryRepository, ProductRepository, Repository, UserRepository};
use crate::errors::AppError;
use crate::models::history::ValidationRecord;
use crate::models::product::Product;
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
pub struct MemoryRepository {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
    history: RwLock<Vec<ValidationRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, input: &NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == input.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.users.read().await.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryRepository {
    async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, AppError> {
        let products = self.products.read().await;
        let Some(term) = search.map(str::to_lowercase) else {
            return Ok(products.clone());
        };
        Ok(products
            .iter()
            .filter(|p| {
                p.product_name.to_lowercase().contains(&term)
                    || p.batch_number_format.to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }

    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<Product>, AppError> {
        if barcode.is_empty() {
            return Ok(None);
        }
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.barcode == barcode).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<Product, AppError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(AppError::Conflict(format!(
                "Product '{}' already exists",
                product.id
            )));
        }
        products.insert(0, product.clone());
        Ok(product.clone())
    }

    async fn update_product(&self, product: &Product) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write().await;
        let Some(stored) = products.iter_mut().find(|p| p.id == product.id) else {
            return Ok(None);
        };
        stored.product_name = product.product_name.clone();
        stored.barcode = product.barcode.clone();
        stored.production_date = product.production_date;
        stored.updated_at = product.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

#[async_trait]
impl HistoryRepository for MemoryRepository {
    async fn append_record(&self, record: &ValidationRecord) -> Result<ValidationRecord, AppError> {
        self.history.write().await.insert(0, record.clone());
        Ok(record.clone())
    }

    async fn list_records(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ValidationRecord>, i64), AppError> {
        let history = self.history.read().await;
        let matching: Vec<&ValidationRecord> = history
            .iter()
            .filter(|r| user_id.map_or(true, |id| r.user_id == id))
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
