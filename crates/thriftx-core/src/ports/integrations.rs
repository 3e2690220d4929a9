//! Ports for third-party SaaS integrations: image hosting, geocoding and mail.

use async_trait::async_trait;

/// Stores uploaded images and returns a public URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, IntegrationError>;
}

/// A resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a free-form address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service answered but found nothing.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, IntegrationError>;
}

/// A contact-form message ready to be delivered.
#[derive(Debug, Clone)]
pub struct ContactEmail {
    pub name: String,
    pub email: String,
    pub store_address: String,
    pub location: Coordinates,
    /// Full message body including the appended contact and location details.
    pub message: String,
}

/// Delivers contact-form messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ContactEmail) -> Result<(), IntegrationError>;
}

/// Integration errors.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<IntegrationError> for crate::error::DomainError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::NotConfigured(service) => {
                tracing::error!(service, "Integration not configured");
                Self::Internal(format!("{service} is not configured"))
            }
            other => {
                tracing::error!(error = %other, "Integration call failed");
                Self::Upstream(other.to_string())
            }
        }
    }
}
