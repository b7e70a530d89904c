//! Image-text extraction: reads a barcode or batch code off a packaging photo.
//!
//! Extraction is best effort. Implementations return an empty string when the
//! field cannot be found and reserve errors for transport failures.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::errors::AppError;

/// MIME types accepted for packaging images.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif"];

const BARCODE_PROMPT: &str = "From the product package image, extract only the barcode number. \
The barcode may be oriented vertically or horizontally. Provide the response in JSON format. \
If a value cannot be found, return an empty string for that key.";

const BATCH_PROMPT: &str = "From the product package image, extract only the text corresponding \
to 'Batch No.'. Provide the response in JSON format. If a value cannot be found, return an empty \
string for that key.";

/// An uploaded packaging image.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageInput {
    /// Check the upload against the accepted types and size limit.
    pub fn new(bytes: Vec<u8>, mime_type: &str, max_bytes: usize) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation(
                "Please select or capture an image.".to_string(),
            ));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "File size must be less than {}.",
                size_label(max_bytes)
            )));
        }
        let mime_type = mime_type.to_ascii_lowercase();
        if !ACCEPTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
            return Err(AppError::Validation(format!(
                "Unsupported image type '{mime_type}'"
            )));
        }
        Ok(Self { bytes, mime_type })
    }

    /// Hex SHA-256 of the image, stored in history instead of the image itself.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Human-readable size limit, rounded down to whole MB or KB.
fn size_label(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;
    match bytes {
        b if b >= MIB => format!("{}MB", b / MIB),
        b if b >= KIB => format!("{}KB", b / KIB),
        b => format!("{b} bytes"),
    }
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_barcode(&self, image: &ImageInput) -> Result<String, AppError>;
    async fn extract_batch_code(&self, image: &ImageInput) -> Result<String, AppError>;
}

/// Settings for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Extractor backed by the Gemini API with a JSON response schema.
#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    settings: GeminiSettings,
    http_client: Client,
}

impl GeminiExtractor {
    pub fn new(settings: GeminiSettings) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            settings,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// Ask the model for a single string field and return its trimmed value.
    async fn extract_field(
        &self,
        image: &ImageInput,
        prompt: &str,
        field: &str,
        description: &str,
    ) -> Result<String, AppError> {
        let body = request_body(image, prompt, field, description);

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Extraction request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read extraction response: {e}")))?;

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Extraction API returned {status}: {text}"
            )));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| AppError::Upstream(format!("Invalid extraction response: {e}")))?;

        let value = parse_field(&payload, field);
        tracing::debug!(field, found = !value.is_empty(), "Extraction finished");
        Ok(value)
    }
}

#[async_trait]
impl TextExtractor for GeminiExtractor {
    async fn extract_barcode(&self, image: &ImageInput) -> Result<String, AppError> {
        self.extract_field(
            image,
            BARCODE_PROMPT,
            "barcode",
            "The numerical barcode value found on the product packaging.",
        )
        .await
    }

    async fn extract_batch_code(&self, image: &ImageInput) -> Result<String, AppError> {
        self.extract_field(
            image,
            BATCH_PROMPT,
            "batchNumber",
            "The batch number found on the product packaging.",
        )
        .await
    }
}

fn request_body(image: &ImageInput, prompt: &str, field: &str, description: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "text": prompt },
                {
                    "inlineData": {
                        "mimeType": image.mime_type,
                        "data": STANDARD.encode(&image.bytes)
                    }
                }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    field: { "type": "STRING", "description": description }
                },
                "required": [field]
            }
        }
    })
}

/// Pull `field` out of the model's JSON text. Unparseable output yields an empty string.
fn parse_field(payload: &Value, field: &str) -> String {
    let text: String = payload["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    match serde_json::from_str::<Value>(text.trim()) {
        Ok(result) => result[field].as_str().unwrap_or_default().trim().to_string(),
        Err(e) => {
            tracing::error!(error = %e, field, "Could not parse extraction output");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png() -> ImageInput {
        ImageInput::new(vec![0x89, b'P', b'N', b'G'], "image/png", 1024).unwrap()
    }

    fn model_reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" }
            }]
        })
    }

    fn extractor(base_url: &str) -> GeminiExtractor {
        GeminiExtractor::new(GeminiSettings {
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn image_input_enforces_size_limit() {
        let err = ImageInput::new(vec![0; 5 * 1024 * 1024], "image/jpeg", 4 * 1024 * 1024)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: File size must be less than 4MB."
        );
    }

    #[test]
    fn size_limit_message_scales_below_one_megabyte() {
        let err = ImageInput::new(vec![0; 2048], "image/gif", 1024).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: File size must be less than 1KB."
        );
        assert_eq!(size_label(512), "512 bytes");
        assert_eq!(size_label(4 * 1024 * 1024 + 10), "4MB");
    }

    #[test]
    fn image_input_rejects_unknown_types() {
        assert!(ImageInput::new(vec![1], "application/pdf", 1024).is_err());
        assert!(ImageInput::new(vec![1], "IMAGE/JPEG", 1024).is_ok());
        assert!(ImageInput::new(Vec::new(), "image/png", 1024).is_err());
    }

    #[test]
    fn image_digest_is_hex_sha256() {
        let digest = png().sha256_hex();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_field_reads_model_json() {
        let payload = model_reply("{\"batchNumber\": \" 42B11 \"}");
        assert_eq!(parse_field(&payload, "batchNumber"), "42B11");
    }

    #[test]
    fn parse_field_tolerates_garbage() {
        assert_eq!(parse_field(&model_reply("not json"), "barcode"), "");
        assert_eq!(parse_field(&json!({}), "barcode"), "");
        assert_eq!(parse_field(&model_reply("{\"other\": \"1\"}"), "barcode"), "");
    }

    #[test]
    fn request_body_inlines_image() {
        let body = request_body(&png(), "prompt", "barcode", "desc");
        let image = &body["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(image["mimeType"], "image/png");
        assert_eq!(image["data"], STANDARD.encode([0x89, b'P', b'N', b'G']));
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"][0],
            "barcode"
        );
    }

    #[tokio::test]
    async fn extracts_barcode_from_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(model_reply("{\"barcode\": \"8901234567890\"}")),
            )
            .mount(&server)
            .await;

        let barcode = extractor(&server.uri()).extract_barcode(&png()).await.unwrap();
        assert_eq!(barcode, "8901234567890");
    }

    #[tokio::test]
    async fn api_failure_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let result = extractor(&server.uri()).extract_batch_code(&png()).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
