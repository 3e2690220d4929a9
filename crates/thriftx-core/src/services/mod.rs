//! Application services - use cases composed from domain types and ports.

pub mod accounts;
pub mod contact;
pub mod content;
pub mod media;
pub mod newsletter;
pub mod session;

pub use accounts::{AccountService, AdminCredentials, LoginSession};
pub use contact::{ContactForm, ContactService};
pub use content::{ContentService, POSTS_CACHE_TAG, parse_post_id};
pub use media::MediaService;
pub use newsletter::{NewsletterService, SubscribeOutcome};
pub use session::{Principal, SessionAuthority, SessionUser};
