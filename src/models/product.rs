//! Product catalog model: each product carries the batch number format its codes must follow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    pub barcode: String,
    pub batch_number_format: String,
    pub production_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(custom(function = "not_blank"))]
    pub product_name: String,
    #[serde(default)]
    pub barcode: String,
    #[validate(length(min = 1, message = "batch number format is required"))]
    pub batch_number_format: String,
    pub production_date: Option<NaiveDate>,
}

/// Partial update. `batch_number_format` is accepted only when it equals the stored value.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateProduct {
    #[validate(custom(function = "not_blank"))]
    pub product_name: Option<String>,
    pub barcode: Option<String>,
    pub batch_number_format: Option<String>,
    pub production_date: Option<NaiveDate>,
}

/// Query parameters for product listing.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProductFilters {
    pub search: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, format: &str) -> CreateProduct {
        CreateProduct {
            product_name: name.to_string(),
            barcode: "8901234567890".to_string(),
            batch_number_format: format.to_string(),
            production_date: None,
        }
    }

    #[test]
    fn create_product_accepts_minimal_input() {
        assert!(create("Sparkling Water 500ml", "HH:MM NNS").validate().is_ok());
    }

    #[test]
    fn create_product_rejects_blank_name() {
        let errors = create("   ", "NNS").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("product_name"));
    }

    #[test]
    fn create_product_rejects_empty_format() {
        let errors = create("Juice", "").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("batch_number_format"));
    }

    #[test]
    fn barcode_defaults_to_empty() {
        let input: CreateProduct = serde_json::from_str(
            r#"{"product_name":"Juice","batch_number_format":"NNS"}"#,
        )
        .unwrap();
        assert_eq!(input.barcode, "");
        assert!(input.production_date.is_none());
    }

    #[test]
    fn update_product_skips_absent_name() {
        assert!(UpdateProduct::default().validate().is_ok());
        let update = UpdateProduct {
            product_name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
