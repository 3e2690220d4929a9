//! OpenStreetMap Nominatim forward geocoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use thriftx_core::ports::{Coordinates, Geocoder, IntegrationError};

use super::{transport_error, upstream_error};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("thriftx-server/", env!("CARGO_PKG_VERSION"));

/// Nominatim endpoint settings.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl NominatimConfig {
    /// Load from `NOMINATIM_URL`, defaulting to the public instance.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("NOMINATIM_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            ..Self::default()
        }
    }
}

/// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    client: Client,
    search_url: Url,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, IntegrationError> {
        let base = config.base_url.trim_end_matches('/');
        let search_url = Url::parse(&format!("{base}/search"))
            .map_err(|e| IntegrationError::Transport(format!("invalid Nominatim URL: {e}")))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(transport_error)?;
        Ok(Self { client, search_url })
    }
}

fn first_hit(body: &[u8]) -> Result<Option<Coordinates>, IntegrationError> {
    let places: Vec<Place> = serde_json::from_slice(body)
        .map_err(|e| IntegrationError::Decode(format!("invalid Nominatim JSON: {e}")))?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let parse = |raw: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|e| IntegrationError::Decode(format!("invalid coordinate {raw:?}: {e}")))
    };
    Ok(Some(Coordinates {
        latitude: parse(&place.lat)?,
        longitude: parse(&place.lon)?,
    }))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, IntegrationError> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body = response.bytes().await.map_err(transport_error)?;
        first_hit(&body)
    }
}
