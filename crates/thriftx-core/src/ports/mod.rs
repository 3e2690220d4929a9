//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod integrations;
mod repository;

pub use auth::{
    ADMIN_SESSION_TTL, AuthError, PasswordService, SessionClaims, TokenService, USER_SESSION_TTL,
};
pub use cache::{Cache, CacheError};
pub use integrations::{ContactEmail, Coordinates, Geocoder, ImageHost, IntegrationError, Mailer};
pub use repository::{BaseRepository, NewsletterRepository, PostRepository, UserRepository};
