//! Cloudinary signed image upload.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use thriftx_core::ports::{ImageHost, IntegrationError};

use super::{transport_error, upstream_error};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_FOLDER: &str = "thriftx-blog";

/// Cloudinary account settings.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl CloudinaryConfig {
    /// Load from `CLOUDINARY_*` variables. `None` unless name, key and secret are all set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self {
            cloud_name: var("CLOUDINARY_CLOUD_NAME")?,
            api_key: var("CLOUDINARY_API_KEY")?,
            api_secret: var("CLOUDINARY_API_SECRET")?,
            folder: var("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    secure_url: Option<String>,
}

/// Uploads images through Cloudinary's signed upload API.
pub struct CloudinaryImageHost {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryImageHost {
    pub fn new(config: CloudinaryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!("{API_BASE}/{}/image/upload", self.config.cloud_name)
    }
}

/// Signature over the alphabetically sorted parameters followed by the secret.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha1::digest(format!("{joined}{secret}").as_bytes()))
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, IntegrationError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let size = bytes.len();
        let file = Part::bytes(bytes)
            .file_name("upload")
            .mime_str(content_type)
            .map_err(transport_error)?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        tracing::debug!(bytes = size, folder = %self.config.folder, "Uploading image to Cloudinary");
        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let result: UploadResult = response
            .json()
            .await
            .map_err(|e| IntegrationError::Decode(e.to_string()))?;
        result
            .secure_url
            .ok_or_else(|| IntegrationError::Decode("Upload failed".to_string()))
    }
}
