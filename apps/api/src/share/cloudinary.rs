//! Signed image uploads to Cloudinary.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
/// Largest decoded image accepted for upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Request body cap for share uploads: the base64 form of `MAX_IMAGE_BYTES`
/// plus room for the other JSON fields.
pub const MAX_SHARE_BODY_BYTES: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;
const ALLOWED_IMAGE_TYPES: &[&str] = &["png", "jpeg", "jpg", "webp"];

#[derive(Debug, Error)]
pub enum CloudinaryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloudinary API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<CloudinaryError> for AppError {
    fn from(err: CloudinaryError) -> Self {
        AppError::upstream("cloudinary", err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorEnvelope {
    error: CloudinaryErrorBody,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

/// Checks that `image` is a base64 `data:` URL of an allowed type and size.
pub fn validate_data_url(image: &str) -> Result<(), AppError> {
    let invalid = || {
        AppError::Validation(
            "image must be a base64 data URL (png, jpeg or webp)".to_string(),
        )
    };
    let rest = image.strip_prefix("data:image/").ok_or_else(invalid)?;
    let (kind, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    if !ALLOWED_IMAGE_TYPES.contains(&kind) || payload.is_empty() {
        return Err(invalid());
    }
    let decoded_len = payload.len() / 4 * 3;
    if decoded_len > MAX_IMAGE_BYTES {
        return Err(AppError::Validation("image must be at most 10 MB".to_string()));
    }
    Ok(())
}

/// Cloudinary signature: parameters sorted by key, joined as `k=v&...`,
/// secret appended, SHA-1 hex digest.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryClient {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            cloud_name,
            api_key,
            api_secret,
        })
    }

    /// Uploads a data URL under `folder/public_id`, replacing any previous image.
    pub async fn upload_image(
        &self,
        data_url: &str,
        folder: &str,
        public_id: &str,
    ) -> Result<UploadedImage, CloudinaryError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signed = vec![
            ("folder", folder.to_string()),
            ("overwrite", "true".to_string()),
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
        ];
        let signature = sign_params(&signed, &self.api_secret);

        let mut form: Vec<(&str, String)> = signed;
        form.push(("api_key", self.api_key.clone()));
        form.push(("signature", signature));
        form.push(("file", data_url.to_string()));

        let response = self
            .client
            .post(format!("{CLOUDINARY_API_BASE}/{}/image/upload", self.cloud_name))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Cloudinary returned {status}: {body}");
            let message = serde_json::from_str::<CloudinaryErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CloudinaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadedImage = response.json().await?;
        debug!("Uploaded {} to Cloudinary", uploaded.public_id);
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_matches_documented_example() {
        // Example from Cloudinary's "generating authentication signatures" guide.
        let params = [
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample_image".to_string()),
            ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string()),
        ];
        assert_eq!(
            sign_params(&params, "abcd"),
            "bfd09f95f331f558cbd1320e67aa8d488770583e"
        );
    }

    #[test]
    fn test_validate_data_url() {
        assert!(validate_data_url("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(validate_data_url("data:image/webp;base64,UklGR").is_ok());
        assert!(validate_data_url("https://example.com/a.png").is_err());
        assert!(validate_data_url("data:image/gif;base64,R0lG").is_err());
        assert!(validate_data_url("data:image/png;base64,").is_err());
        assert!(validate_data_url("data:image/png,raw").is_err());
    }

    #[test]
    fn test_validate_data_url_size_limit() {
        let big = format!("data:image/png;base64,{}", "A".repeat(MAX_IMAGE_BYTES / 3 * 4 + 8));
        assert!(validate_data_url(&big).is_err());
    }

    #[test]
    fn test_largest_image_fits_share_body() {
        let payload = "A".repeat(MAX_IMAGE_BYTES / 3 * 4);
        let image = format!("data:image/png;base64,{payload}");
        assert!(validate_data_url(&image).is_ok());
        let body = serde_json::json!({"questionnaire_type": "mbti", "image": image}).to_string();
        assert!(body.len() < MAX_SHARE_BODY_BYTES);
    }
}
