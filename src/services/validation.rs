//! Validation workflow: identify the product from a barcode image, then check
//! a batch code (read from a second image or typed in) against its format.
//!
//! Every completed check is appended to the history log. Failures are never
//! retried here; the caller starts over with a new request.

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::history::{ValidationMethod, ValidationRecord};
use crate::models::product::Product;
use crate::models::validation::{
    BarcodeLookup, FormatCheckRequest, FormatCheckResponse, ManualValidationRequest,
    ValidationOutcome, ValidationStatus,
};
use crate::repository::{HistoryRepository, ProductRepository};
use crate::services::batch_format::{self, BatchFormat};
use crate::services::extraction::{ImageInput, TextExtractor};
use crate::services::{history as history_service, product as product_service};

/// Step one: read the barcode off `image` and find the matching product.
pub async fn identify_product<R, E>(
    repo: &R,
    extractor: &E,
    image: &ImageInput,
) -> Result<BarcodeLookup, AppError>
where
    R: ProductRepository + ?Sized,
    E: TextExtractor + ?Sized,
{
    let barcode = extractor.extract_barcode(image).await?;
    if barcode.is_empty() {
        return Err(AppError::Extraction(
            "Could not read barcode from the image.".to_string(),
        ));
    }

    let product = product_service::find_by_barcode(repo, &barcode).await?;
    tracing::info!(product_id = %product.id, barcode = %barcode, "Product identified");

    Ok(BarcodeLookup {
        status: ValidationStatus::Success,
        barcode,
        product,
    })
}

/// Step two: read the batch code off `image` and check it against the product's format.
pub async fn validate_batch_image<R, E>(
    repo: &R,
    extractor: &E,
    user: &CurrentUser,
    product_id: Uuid,
    barcode: &str,
    image: &ImageInput,
) -> Result<ValidationOutcome, AppError>
where
    R: ProductRepository + HistoryRepository + ?Sized,
    E: TextExtractor + ?Sized,
{
    let product = product_service::find_by_id(repo, product_id).await?;

    let batch_code = extractor.extract_batch_code(image).await?;
    if batch_code.is_empty() {
        return Err(AppError::Extraction(
            "Could not read batch code from the image.".to_string(),
        ));
    }

    let barcode = match barcode.trim() {
        "" => product.barcode.as_str(),
        scanned => scanned,
    };
    let mut record = new_record(user, &product, barcode, &batch_code, ValidationMethod::Ocr);
    record.image_sha256 = Some(image.sha256_hex());
    record.image_mime_type = Some(image.mime_type.clone());

    finish(repo, record).await
}

/// Check a typed batch code against the product found by barcode.
pub async fn validate_manual<R>(
    repo: &R,
    user: &CurrentUser,
    input: &ManualValidationRequest,
) -> Result<ValidationOutcome, AppError>
where
    R: ProductRepository + HistoryRepository + ?Sized,
{
    let batch_code = input.batch_code.trim();
    if batch_code.is_empty() {
        return Err(AppError::Validation("batch code is required".to_string()));
    }

    let product = product_service::find_by_barcode(repo, &input.barcode).await?;

    let mut record = new_record(
        user,
        &product,
        input.barcode.trim(),
        batch_code,
        ValidationMethod::Manual,
    );
    record.extracted_production_date = input.production_date.clone();
    record.extracted_expiry_date = input.expiry_date.clone();
    record.extracted_price = input.price.clone();

    finish(repo, record).await
}

/// Evaluate a candidate against a format without touching storage.
pub fn check_format(input: &FormatCheckRequest) -> FormatCheckResponse {
    FormatCheckResponse {
        is_match: batch_format::matches(&input.candidate, &input.format),
        pattern: BatchFormat::compile(&input.format).map(|rule| rule.pattern().to_string()),
    }
}

fn new_record(
    user: &CurrentUser,
    product: &Product,
    barcode: &str,
    batch_code: &str,
    method: ValidationMethod,
) -> ValidationRecord {
    ValidationRecord {
        id: Uuid::new_v4(),
        user_id: user.id,
        product_id: Some(product.id),
        product_name: Some(product.product_name.clone()),
        batch_format: Some(product.batch_number_format.clone()),
        extracted_barcode: barcode.to_string(),
        extracted_batch: batch_code.to_string(),
        is_valid: batch_format::matches(batch_code, &product.batch_number_format),
        validation_method: method,
        image_sha256: None,
        image_mime_type: None,
        extracted_production_date: None,
        extracted_expiry_date: None,
        extracted_price: None,
        created_at: Utc::now(),
    }
}

async fn finish<R>(repo: &R, record: ValidationRecord) -> Result<ValidationOutcome, AppError>
where
    R: HistoryRepository + ?Sized,
{
    let record = history_service::record(repo, &record).await?;
    Ok(ValidationOutcome {
        status: ValidationStatus::Success,
        is_valid: record.is_valid,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::CreateProduct;
    use crate::models::user::UserRole;
    use crate::repository::MemoryRepository;
    use async_trait::async_trait;

    /// Returns canned text for each field.
    struct CannedExtractor {
        barcode: String,
        batch: String,
    }

    #[async_trait]
    impl TextExtractor for CannedExtractor {
        async fn extract_barcode(&self, _image: &ImageInput) -> Result<String, AppError> {
            Ok(self.barcode.clone())
        }

        async fn extract_batch_code(&self, _image: &ImageInput) -> Result<String, AppError> {
            Ok(self.batch.clone())
        }
    }

    fn extractor(barcode: &str, batch: &str) -> CannedExtractor {
        CannedExtractor {
            barcode: barcode.to_string(),
            batch: batch.to_string(),
        }
    }

    fn image() -> ImageInput {
        ImageInput::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg", 1024).unwrap()
    }

    fn operator() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "operator".to_string(),
            role: UserRole::Staff,
        }
    }

    async fn seeded_repo() -> (MemoryRepository, Product) {
        let repo = MemoryRepository::new();
        let product = product_service::create(
            &repo,
            &CreateProduct {
                product_name: "Sparkling Water 500ml".to_string(),
                barcode: "8901234567890".to_string(),
                batch_number_format: "HH:MM NNS".to_string(),
                production_date: None,
            },
        )
        .await
        .unwrap();
        (repo, product)
    }

    #[tokio::test]
    async fn identifies_product_by_barcode() {
        let (repo, product) = seeded_repo().await;
        let lookup = identify_product(&repo, &extractor("8901234567890", ""), &image())
            .await
            .unwrap();
        assert_eq!(lookup.product.id, product.id);
        assert_eq!(lookup.status, ValidationStatus::Success);
    }

    #[tokio::test]
    async fn unreadable_barcode_is_extraction_failure() {
        let (repo, _) = seeded_repo().await;
        let err = identify_product(&repo, &extractor("", ""), &image())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn unknown_barcode_is_lookup_failure() {
        let (repo, _) = seeded_repo().await;
        let err = identify_product(&repo, &extractor("000", ""), &image())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn batch_image_is_checked_and_recorded() {
        let (repo, product) = seeded_repo().await;
        let user = operator();

        let outcome = validate_batch_image(
            &repo,
            &extractor("", "08:30   12A"),
            &user,
            product.id,
            "8901234567890",
            &image(),
        )
        .await
        .unwrap();

        assert!(outcome.is_valid);
        assert_eq!(outcome.record.validation_method, ValidationMethod::Ocr);
        assert_eq!(outcome.record.batch_format.as_deref(), Some("HH:MM NNS"));
        assert_eq!(outcome.record.image_mime_type.as_deref(), Some("image/jpeg"));
        assert!(outcome.record.image_sha256.is_some());

        let (records, total) = repo.list_records(Some(user.id), 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records[0].id, outcome.record.id);
    }

    #[tokio::test]
    async fn invalid_batch_is_still_recorded() {
        let (repo, product) = seeded_repo().await;
        let user = operator();

        let outcome = validate_batch_image(
            &repo,
            &extractor("", "24:00 12A"),
            &user,
            product.id,
            "8901234567890",
            &image(),
        )
        .await
        .unwrap();

        assert!(!outcome.is_valid);
        let (_, total) = repo.list_records(Some(user.id), 10, 0).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn unreadable_batch_records_nothing() {
        let (repo, product) = seeded_repo().await;
        let user = operator();

        let err = validate_batch_image(
            &repo,
            &extractor("", ""),
            &user,
            product.id,
            "8901234567890",
            &image(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
        let (_, total) = repo.list_records(None, 10, 0).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn manual_entry_is_recorded() {
        let (repo, product) = seeded_repo().await;
        let user = operator();

        let outcome = validate_manual(
            &repo,
            &user,
            &ManualValidationRequest {
                barcode: " 8901234567890 ".to_string(),
                batch_code: "23:59 99c".to_string(),
                production_date: Some("2026-03-01".to_string()),
                expiry_date: None,
                price: Some("1.20".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(outcome.is_valid);
        assert_eq!(outcome.record.product_id, Some(product.id));
        assert_eq!(outcome.record.validation_method, ValidationMethod::Manual);
        assert_eq!(outcome.record.extracted_barcode, "8901234567890");
        assert_eq!(outcome.record.extracted_price.as_deref(), Some("1.20"));
        assert!(outcome.record.image_sha256.is_none());
    }

    #[tokio::test]
    async fn manual_entry_requires_batch_code() {
        let (repo, _) = seeded_repo().await;
        let result = validate_manual(
            &repo,
            &operator(),
            &ManualValidationRequest {
                barcode: "8901234567890".to_string(),
                batch_code: "  ".to_string(),
                production_date: None,
                expiry_date: None,
                price: None,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn format_check_reports_pattern() {
        let response = check_format(&FormatCheckRequest {
            candidate: "42B11".to_string(),
            format: "NNS11".to_string(),
        });
        assert!(response.is_match);
        assert_eq!(response.pattern.as_deref(), Some("^[0-9][0-9][A-C]11$"));

        let empty = check_format(&FormatCheckRequest {
            candidate: "42B11".to_string(),
            format: String::new(),
        });
        assert!(!empty.is_match);
        assert!(empty.pattern.is_none());
    }

    #[tokio::test]
    async fn missing_scanned_barcode_falls_back_to_product() {
        let (repo, product) = seeded_repo().await;

        let outcome = validate_batch_image(
            &repo,
            &extractor("", "08:30 12A"),
            &operator(),
            product.id,
            "  ",
            &image(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.record.extracted_barcode, product.barcode);
    }
}
