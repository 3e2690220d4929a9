//! Application configuration loaded from environment variables.

use std::env;

use thriftx_core::services::AdminCredentials;
use thriftx_infra::JwtConfig;

#[cfg(feature = "postgres")]
use thriftx_infra::DatabaseConfig;
#[cfg(feature = "integrations")]
use thriftx_infra::integrations::{CloudinaryConfig, EmailJsConfig, NominatimConfig};
#[cfg(feature = "redis")]
use thriftx_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub admin: AdminCredentials,
    /// Accounts with this email are admins when logged in as users.
    pub admin_email: String,
    pub cookie_secure: bool,
    /// Public origin of the marketing site, used in the sitemap.
    pub site_url: String,
    #[cfg(feature = "integrations")]
    pub cloudinary: Option<CloudinaryConfig>,
    #[cfg(feature = "integrations")]
    pub emailjs: Option<EmailJsConfig>,
    #[cfg(feature = "integrations")]
    pub nominatim: NominatimConfig,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn is_production() -> bool {
    env::var("RUST_ENV")
        .map(|v| v == "production" || v == "prod")
        .unwrap_or(false)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed_or("DB_MIN_CONNECTIONS", 2),
        });

        let admin = AdminCredentials {
            username: var_or("ADMIN_USER", "admin"),
            password: var_or("ADMIN_PASS", "admin"),
        };
        if admin.password == "admin" && is_production() {
            tracing::error!("SECURITY: Using default admin password in production! Set ADMIN_PASS.");
        }

        Self {
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            jwt: JwtConfig::from_env(),
            admin,
            admin_email: var_or("ADMIN_EMAIL", "admin@admin.com"),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or_else(|_| is_production()),
            site_url: var_or("SITE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            #[cfg(feature = "integrations")]
            cloudinary: CloudinaryConfig::from_env(),
            #[cfg(feature = "integrations")]
            emailjs: EmailJsConfig::from_env(),
            #[cfg(feature = "integrations")]
            nominatim: NominatimConfig::from_env(),
        }
    }
}
