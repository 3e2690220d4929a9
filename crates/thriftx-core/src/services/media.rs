//! Admin image uploads to the configured image host.

use std::sync::Arc;

use crate::error::DomainError;
use crate::ports::ImageHost;

use super::session::Principal;

pub struct MediaService {
    host: Arc<dyn ImageHost>,
}

impl MediaService {
    pub fn new(host: Arc<dyn ImageHost>) -> Self {
        Self { host }
    }

    /// Upload an image and return its public URL.
    pub async fn upload_image(
        &self,
        principal: &Principal,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, DomainError> {
        principal.require_admin()?;
        if !content_type.starts_with("image/") {
            return Err(DomainError::validation("Only image uploads are accepted"));
        }
        if bytes.is_empty() {
            return Err(DomainError::validation("Upload body is empty"));
        }

        let size = bytes.len();
        let url = self.host.upload(bytes, content_type).await?;
        tracing::info!(size, url = %url, "Image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::ports::IntegrationError;

    struct EchoHost;

    #[async_trait]
    impl ImageHost for EchoHost {
        async fn upload(
            &self,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<String, IntegrationError> {
            Ok(format!("https://cdn.test/{}/{}", content_type, bytes.len()))
        }
    }

    struct MissingHost;

    #[async_trait]
    impl ImageHost for MissingHost {
        async fn upload(&self, _: Vec<u8>, _: &str) -> Result<String, IntegrationError> {
            Err(IntegrationError::NotConfigured("Cloudinary"))
        }
    }

    fn admin() -> Principal {
        Principal {
            user: None,
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn test_upload_returns_host_url() {
        let media = MediaService::new(Arc::new(EchoHost));
        let url = media.upload_image(&admin(), vec![1, 2], "image/png").await.unwrap();
        assert_eq!(url, "https://cdn.test/image/png/2");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_admin_and_non_images() {
        let media = MediaService::new(Arc::new(EchoHost));

        assert!(matches!(
            media.upload_image(&Principal::anonymous(), vec![1], "image/png").await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            media.upload_image(&admin(), vec![1], "application/pdf").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            media.upload_image(&admin(), Vec::new(), "image/png").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_host_is_internal() {
        let media = MediaService::new(Arc::new(MissingHost));
        assert!(matches!(
            media.upload_image(&admin(), vec![1], "image/jpeg").await,
            Err(DomainError::Internal(_))
        ));
    }
}
