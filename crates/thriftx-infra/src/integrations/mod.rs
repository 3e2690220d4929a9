//! HTTP adapters for the hosted services the site depends on.
//!
//! Adapters needing credentials have a `from_env` constructor returning
//! `None` when they are absent. Callers then wire in [`Unconfigured`].

#[cfg(feature = "integrations")]
mod cloudinary;
#[cfg(feature = "integrations")]
mod emailjs;
#[cfg(feature = "integrations")]
mod nominatim;
mod unconfigured;

#[cfg(feature = "integrations")]
pub use cloudinary::{CloudinaryConfig, CloudinaryImageHost};
#[cfg(feature = "integrations")]
pub use emailjs::{EmailJsConfig, EmailJsMailer};
#[cfg(feature = "integrations")]
pub use nominatim::{NominatimConfig, NominatimGeocoder};
pub use unconfigured::Unconfigured;

#[cfg(feature = "integrations")]
fn transport_error(err: reqwest::Error) -> thriftx_core::ports::IntegrationError {
    thriftx_core::ports::IntegrationError::Transport(err.to_string())
}

/// Read the body of a non-success response into an upstream error.
#[cfg(feature = "integrations")]
async fn upstream_error(response: reqwest::Response) -> thriftx_core::ports::IntegrationError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    thriftx_core::ports::IntegrationError::Upstream { status, body }
}
