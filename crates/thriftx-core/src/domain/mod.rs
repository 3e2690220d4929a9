//! Domain entities - the core business objects.

mod email;
mod newsletter;
mod post;
mod user;

pub use email::{EmailAddress, mask_email};
pub use newsletter::NewsletterSubscription;
pub use post::{NewPost, Post, PostChanges, PostSummary, normalize_tags, parse_post_date};
pub use user::User;
