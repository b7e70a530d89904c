//! Postgres-backed repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{HistoryRepository, ProductRepository, Repository, UserRepository};
use crate::errors::AppError;
use crate::models::history::ValidationRecord;
use crate::models::product::Product;
use crate::models::user::{NewUser, User};

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, input: &NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(input.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Username already exists".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PgRepository {
    async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, AppError> {
        let products = match search {
            Some(term) => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT * FROM products
                    WHERE product_name ILIKE $1 OR batch_number_format ILIKE $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(format!("%{}%", escape_like(term)))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(products)
    }

    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<Product>, AppError> {
        if barcode.is_empty() {
            return Ok(None);
        }
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE barcode = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn insert_product(&self, product: &Product) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, product_name, barcode, batch_number_format,
                production_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(&product.product_name)
        .bind(&product.barcode)
        .bind(&product.batch_number_format)
        .bind(product.production_date)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Product '{}' already exists", product.id))
            }
            _ => AppError::Database(e),
        })
    }

    async fn update_product(&self, product: &Product) -> Result<Option<Product>, AppError> {
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET product_name = $2, barcode = $3, production_date = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(&product.product_name)
        .bind(&product.barcode)
        .bind(product.production_date)
        .bind(product.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HistoryRepository for PgRepository {
    async fn append_record(&self, record: &ValidationRecord) -> Result<ValidationRecord, AppError> {
        let stored = sqlx::query_as::<_, ValidationRecord>(
            r#"
            INSERT INTO validation_history (id, user_id, product_id, product_name, batch_format,
                extracted_barcode, extracted_batch, is_valid, validation_method,
                image_sha256, image_mime_type, extracted_production_date,
                extracted_expiry_date, extracted_price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.product_id)
        .bind(&record.product_name)
        .bind(&record.batch_format)
        .bind(&record.extracted_barcode)
        .bind(&record.extracted_batch)
        .bind(record.is_valid)
        .bind(record.validation_method)
        .bind(&record.image_sha256)
        .bind(&record.image_mime_type)
        .bind(&record.extracted_production_date)
        .bind(&record.extracted_expiry_date)
        .bind(&record.extracted_price)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn list_records(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ValidationRecord>, i64), AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM validation_history WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let records = sqlx::query_as::<_, ValidationRecord>(
            r#"
            SELECT * FROM validation_history
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((records, total))
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Escape `%`, `_` and `\` so a search term is matched literally inside ILIKE.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
