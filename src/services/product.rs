//! Product catalog service: CRUD and search.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::product::{CreateProduct, Product, ProductFilters, UpdateProduct};
use crate::repository::ProductRepository;

/// Create a new product. The production date defaults to today.
pub async fn create<R>(repo: &R, input: &CreateProduct) -> Result<Product, AppError>
where
    R: ProductRepository + ?Sized,
{
    input.validate()?;

    let barcode = input.barcode.trim().to_string();
    if barcode.is_empty() {
        tracing::warn!(product_name = %input.product_name, "Creating product without a barcode");
    }

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        product_name: input.product_name.trim().to_string(),
        barcode,
        batch_number_format: input.batch_number_format.clone(),
        production_date: input.production_date.unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
    };

    let product = repo.insert_product(&product).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok(product)
}

/// Find product by ID.
pub async fn find_by_id<R>(repo: &R, id: Uuid) -> Result<Product, AppError>
where
    R: ProductRepository + ?Sized,
{
    repo.find_product_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Find product by barcode.
pub async fn find_by_barcode<R>(repo: &R, barcode: &str) -> Result<Product, AppError>
where
    R: ProductRepository + ?Sized,
{
    let barcode = barcode.trim();
    repo.find_product_by_barcode(barcode).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Product with barcode \"{barcode}\" not found in the database."
        ))
    })
}

/// List products, optionally filtered by a search term.
pub async fn list<R>(repo: &R, filters: &ProductFilters) -> Result<Vec<Product>, AppError>
where
    R: ProductRepository + ?Sized,
{
    let search = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    repo.list_products(search).await
}

/// Update a product. The batch number format cannot change once attached.
pub async fn update<R>(repo: &R, id: Uuid, input: &UpdateProduct) -> Result<Product, AppError>
where
    R: ProductRepository + ?Sized,
{
    input.validate()?;

    let mut product = find_by_id(repo, id).await?;

    if let Some(format) = &input.batch_number_format {
        if *format != product.batch_number_format {
            return Err(AppError::Conflict(
                "The batch number format of an existing product cannot be changed; create a new product instead"
                    .to_string(),
            ));
        }
    }

    if let Some(name) = &input.product_name {
        product.product_name = name.trim().to_string();
    }
    if let Some(barcode) = &input.barcode {
        product.barcode = barcode.trim().to_string();
    }
    if let Some(date) = input.production_date {
        product.production_date = date;
    }
    product.updated_at = Utc::now();

    let product = repo
        .update_product(&product)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    tracing::info!(product_id = %product.id, "Product updated");
    Ok(product)
}

/// Delete a product. History records keep their product name snapshot.
pub async fn delete<R>(repo: &R, id: Uuid) -> Result<(), AppError>
where
    R: ProductRepository + ?Sized,
{
    if !repo.delete_product(id).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    tracing::info!(product_id = %id, "Product deleted");
    Ok(())
}
