//! Contact form: locate the store, then mail the message.

use std::sync::Arc;

use crate::domain::EmailAddress;
use crate::error::DomainError;
use crate::ports::{ContactEmail, Coordinates, Geocoder, Mailer};

/// Raw contact form fields.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    pub store_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ContactForm {
    /// Coordinates sent with the form, if both are finite and on the globe.
    fn supplied_location(&self) -> Option<Coordinates> {
        let (latitude, longitude) = (self.latitude?, self.longitude?);
        let on_globe = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        on_globe.then_some(Coordinates {
            latitude,
            longitude,
        })
    }
}

pub struct ContactService {
    geocoder: Arc<dyn Geocoder>,
    mailer: Arc<dyn Mailer>,
}

impl ContactService {
    pub fn new(geocoder: Arc<dyn Geocoder>, mailer: Arc<dyn Mailer>) -> Self {
        Self { geocoder, mailer }
    }

    /// Validate, locate and send. Returns the store location.
    ///
    /// The address is geocoded only when the form carries no usable coordinates.
    pub async fn submit(&self, form: ContactForm) -> Result<Coordinates, DomainError> {
        let name = form.name.trim();
        let message = form.message.trim();
        let store_address = form.store_address.trim();
        if name.is_empty() || message.is_empty() || store_address.is_empty() {
            return Err(DomainError::validation(
                "Name, email, message and store address are required",
            ));
        }
        let email = EmailAddress::parse(&form.email)?;

        let location = match form.supplied_location() {
            Some(location) => location,
            None => self
                .geocoder
                .geocode(store_address)
                .await?
                .ok_or_else(|| {
                    DomainError::validation("Address not found. Try a more specific address.")
                })?,
        };

        let outgoing = ContactEmail {
            name: name.to_string(),
            email: email.to_string(),
            store_address: store_address.to_string(),
            message: compose_message(message, name, email.as_str(), store_address, &location),
            location: location.clone(),
        };
        self.mailer.send(&outgoing).await?;

        tracing::info!(from = %email.masked(), "Contact message sent");
        Ok(location)
    }
}

fn compose_message(
    message: &str,
    name: &str,
    email: &str,
    store_address: &str,
    location: &Coordinates,
) -> String {
    format!(
        "{message}\n\nName: {name}\nEmail: {email}\nStore address: {store_address}\nLatitude: {}\nLongitude: {}",
        location.latitude, location.longitude
    )
}
