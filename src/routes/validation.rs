//! Validation workflow routes: barcode lookup, batch check (image or manual), format preview.

use axum::{
    extract::{Multipart, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::validation::{
    BarcodeLookup, FormatCheckRequest, FormatCheckResponse, ManualValidationRequest,
    ValidationOutcome,
};
use crate::services::extraction::ImageInput;
use crate::services::validation as validation_service;
use crate::AppState;

/// Fields collected from a validation multipart form.
#[derive(Debug, Default)]
struct ValidationForm {
    image: Option<ImageInput>,
    product_id: Option<Uuid>,
    barcode: Option<String>,
}

async fn read_form(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> Result<ValidationForm, AppError> {
    let mut form = ValidationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let mime_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
                form.image = Some(ImageInput::new(bytes.to_vec(), &mime_type, max_image_bytes)?);
            }
            "product_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read product_id: {e}")))?;
                let id = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation("Invalid product_id".to_string()))?;
                form.product_id = Some(id);
            }
            "barcode" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read barcode: {e}")))?;
                form.barcode = Some(text.trim().to_string());
            }
            _ => {}
        }
    }

    Ok(form)
}

fn require_image(form: &ValidationForm) -> Result<&ImageInput, AppError> {
    form.image.as_ref().ok_or_else(|| {
        AppError::Validation("Missing 'image' field in multipart request".to_string())
    })
}

/// POST /api/v1/validate/barcode - step one: identify the product from a barcode image.
pub async fn barcode(
    State(state): State<AppState>,
    _user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BarcodeLookup>>, AppError> {
    let form = read_form(multipart, state.config.max_image_bytes).await?;
    let image = require_image(&form)?;

    let lookup =
        validation_service::identify_product(state.repo.as_ref(), state.extractor.as_ref(), image)
            .await?;
    Ok(ApiResponse::success(lookup))
}

/// POST /api/v1/validate/batch - step two: check the batch code on an image.
pub async fn batch(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ValidationOutcome>>, AppError> {
    let form = read_form(multipart, state.config.max_image_bytes).await?;
    let image = require_image(&form)?;
    let product_id = form.product_id.ok_or_else(|| {
        AppError::Validation("Missing 'product_id' field in multipart request".to_string())
    })?;

    let outcome = validation_service::validate_batch_image(
        state.repo.as_ref(),
        state.extractor.as_ref(),
        &user,
        product_id,
        form.barcode.as_deref().unwrap_or(""),
        image,
    )
    .await?;
    Ok(ApiResponse::success(outcome))
}

/// POST /api/v1/validate/manual - check a typed batch code.
pub async fn manual(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ManualValidationRequest>,
) -> Result<Json<ApiResponse<ValidationOutcome>>, AppError> {
    let outcome = validation_service::validate_manual(state.repo.as_ref(), &user, &body).await?;
    Ok(ApiResponse::success(outcome))
}

/// POST /api/v1/formats/check - preview how a format treats a candidate.
pub async fn check_format(
    _user: CurrentUser,
    Json(body): Json<FormatCheckRequest>,
) -> Json<ApiResponse<FormatCheckResponse>> {
    ApiResponse::success(validation_service::check_format(&body))
}
