//! Request and response DTOs for the validation workflow.

use serde::{Deserialize, Serialize};

use crate::models::history::ValidationRecord;
use crate::models::product::Product;

/// Status indicator reported to clients driving the two-step workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Step one result: the product identified from a barcode image.
#[derive(Debug, Clone, Serialize)]
pub struct BarcodeLookup {
    pub status: ValidationStatus,
    pub barcode: String,
    pub product: Product,
}

/// Step two (or manual) result: the stored history record.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub status: ValidationStatus,
    pub is_valid: bool,
    pub record: ValidationRecord,
}

/// Manually typed batch code, checked against the product found by barcode.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualValidationRequest {
    pub barcode: String,
    pub batch_code: String,
    pub production_date: Option<String>,
    pub expiry_date: Option<String>,
    pub price: Option<String>,
}

/// Ad-hoc format check used when authoring a product's batch format.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatCheckRequest {
    pub candidate: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatCheckResponse {
    pub is_match: bool,
    /// Generated regex, absent for an empty format.
    pub pattern: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_idle() {
        assert_eq!(ValidationStatus::default(), ValidationStatus::Idle);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ValidationStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }
}
