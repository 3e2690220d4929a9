//! EmailJS REST delivery of contact-form messages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use thriftx_core::ports::{ContactEmail, IntegrationError, Mailer};

use super::{transport_error, upstream_error};

const SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// EmailJS account settings.
#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    /// Access token required for server-side calls in strict mode.
    pub private_key: Option<String>,
}

impl EmailJsConfig {
    /// Load from `EMAILJS_*` variables. `None` unless service, template and public key are set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self {
            service_id: var("EMAILJS_SERVICE_ID")?,
            template_id: var("EMAILJS_TEMPLATE_ID")?,
            public_key: var("EMAILJS_PUBLIC_KEY")?,
            private_key: var("EMAILJS_PRIVATE_KEY"),
        })
    }
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    user_name: &'a str,
    user_email: &'a str,
    store_address: &'a str,
    location_lat: String,
    location_lon: String,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: TemplateParams<'a>,
}

pub struct EmailJsMailer {
    client: Client,
    config: EmailJsConfig,
}

impl EmailJsMailer {
    pub fn new(config: EmailJsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { client, config })
    }

    fn request<'a>(&'a self, email: &'a ContactEmail) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            access_token: self.config.private_key.as_deref(),
            template_params: TemplateParams {
                user_name: &email.name,
                user_email: &email.email,
                store_address: &email.store_address,
                location_lat: email.location.latitude.to_string(),
                location_lon: email.location.longitude.to_string(),
                message: &email.message,
            },
        }
    }
}

#[async_trait]
impl Mailer for EmailJsMailer {
    async fn send(&self, email: &ContactEmail) -> Result<(), IntegrationError> {
        let response = self
            .client
            .post(SEND_URL)
            .json(&self.request(email))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        tracing::info!(template = %self.config.template_id, "Contact email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use thriftx_core::ports::Coordinates;

    use super::*;

    #[test]
    fn test_request_body_shape() {
        let mailer = EmailJsMailer::new(EmailJsConfig {
            service_id: "svc".into(),
            template_id: "tpl".into(),
            public_key: "pub".into(),
            private_key: None,
        })
        .unwrap();
        let email = ContactEmail {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            store_address: "1 Main St".into(),
            location: Coordinates {
                latitude: 1.5,
                longitude: -2.25,
            },
            message: "Hi".into(),
        };

        let body = serde_json::to_value(mailer.request(&email)).unwrap();

        assert_eq!(body["service_id"], "svc");
        assert_eq!(body["user_id"], "pub");
        assert!(body.get("accessToken").is_none());
        assert_eq!(body["template_params"]["store_address"], "1 Main St");
        assert_eq!(body["template_params"]["location_lat"], "1.5");
        assert_eq!(body["template_params"]["location_lon"], "-2.25");
    }
}
