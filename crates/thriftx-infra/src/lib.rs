//! # ThriftX Infrastructure
//!
//! Concrete implementations of the ports defined in `thriftx-core`.
//! This crate contains database, cache, auth and hosted-service adapters.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `redis` - Redis cache backend
//! - `integrations` - Cloudinary, Nominatim and EmailJS over HTTP

pub mod cache;
pub mod database;
pub mod integrations;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{
    InMemoryNewsletterRepository, InMemoryPostRepository, InMemoryUserRepository,
};
pub use integrations::Unconfigured;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
