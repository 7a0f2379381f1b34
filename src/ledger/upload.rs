//! Image upload to the pinning gateway
//!
//! The gateway accepts a multipart POST with a single `file` part and
//! answers `{"url": "..."}` once the bytes are pinned. Upload failures
//! are never terminal for content creation; the pipeline logs a warning
//! and mints without an image.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CollaboratorError;
use crate::ledger::Uploader;

/// Upload size ceiling enforced before any bytes leave the process.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image MIME types.
pub const ALLOWED_IMAGE_MIME: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// Pre-flight validation shared by every `Uploader` caller.
pub fn validate_image(size: usize, mime: &str) -> Result<(), String> {
    if size == 0 {
        return Err("image is empty".to_string());
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(format!(
            "image is {} bytes, limit is {} bytes",
            size, MAX_UPLOAD_BYTES
        ));
    }
    if !ALLOWED_IMAGE_MIME.contains(&mime) {
        return Err(format!("unsupported image type: {}", mime));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Uploader backed by an HTTP pinning gateway.
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploader {
    pub fn new(endpoint: &str) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, bytes: Vec<u8>, mime: &str) -> Result<String, CollaboratorError> {
        validate_image(bytes.len(), mime)?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("image")
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("upload gateway error: {}", response.status()).into());
        }

        let parsed: UploadResponse = response.json().await?;
        log::debug!("image pinned at {}", parsed.url);
        Ok(parsed.url)
    }
}
