//! Validation history: one append-only record per batch code check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "validation_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValidationMethod {
    Ocr,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ValidationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    /// The batch format the candidate was judged against.
    pub batch_format: Option<String>,
    pub extracted_barcode: String,
    pub extracted_batch: String,
    pub is_valid: bool,
    pub validation_method: ValidationMethod,
    pub image_sha256: Option<String>,
    pub image_mime_type: Option<String>,
    pub extracted_production_date: Option<String>,
    pub extracted_expiry_date: Option<String>,
    pub extracted_price: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// History entry for list views. `username` is only filled in for admin views.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: ValidationRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
