//! SeaORM entities and their conversions to domain types.

pub mod newsletter;
pub mod post;
pub mod user;
