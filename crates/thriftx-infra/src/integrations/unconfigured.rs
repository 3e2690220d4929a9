use async_trait::async_trait;

use thriftx_core::ports::{
    ContactEmail, Coordinates, Geocoder, ImageHost, IntegrationError, Mailer,
};

/// Stand-in for a service whose credentials are missing. Every call fails
/// with [`IntegrationError::NotConfigured`].
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl ImageHost for Unconfigured {
    async fn upload(&self, _bytes: Vec<u8>, _content_type: &str) -> Result<String, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }
}

#[async_trait]
impl Geocoder for Unconfigured {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }
}

#[async_trait]
impl Mailer for Unconfigured {
    async fn send(&self, _email: &ContactEmail) -> Result<(), IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_reports_service_name() {
        let host = Unconfigured("Cloudinary");
        let err = host.upload(vec![1], "image/png").await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured("Cloudinary")));
    }
}
