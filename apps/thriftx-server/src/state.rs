//! Application state - shared across all handlers.

use std::sync::Arc;

use thriftx_core::ports::{
    Cache, Geocoder, ImageHost, Mailer, NewsletterRepository, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use thriftx_core::services::{
    AccountService, AdminCredentials, ContactService, ContentService, MediaService,
    NewsletterService, SessionAuthority,
};
use thriftx_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryNewsletterRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtTokenService, Unconfigured,
};

#[cfg(feature = "postgres")]
use thriftx_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use thriftx_infra::database::{
    PostgresNewsletterRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Cookie attributes that depend on deployment.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
}

/// Adapters the services are built from.
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub subscriptions: Arc<dyn NewsletterRepository>,
    pub cache: Arc<dyn Cache>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub image_host: Arc<dyn ImageHost>,
    pub geocoder: Arc<dyn Geocoder>,
    pub mailer: Arc<dyn Mailer>,
}

impl Ports {
    /// In-memory storage and cache, no hosted services.
    pub fn in_memory(tokens: Arc<dyn TokenService>) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            subscriptions: Arc::new(InMemoryNewsletterRepository::new()),
            cache: Arc::new(InMemoryCache::new()),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            image_host: Arc::new(Unconfigured("Cloudinary")),
            geocoder: Arc::new(Unconfigured("Nominatim")),
            mailer: Arc::new(Unconfigured("EmailJS")),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionAuthority>,
    pub accounts: Arc<AccountService>,
    pub content: Arc<ContentService>,
    pub newsletter: Arc<NewsletterService>,
    pub contact: Arc<ContactService>,
    pub media: Arc<MediaService>,
    pub cookies: CookieSettings,
    pub site_url: Arc<str>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let mut ports = Ports::in_memory(Arc::new(JwtTokenService::new(config.jwt.clone())));

        #[cfg(feature = "redis")]
        if let Some(redis) = &config.redis {
            match thriftx_infra::RedisCache::new(redis.clone()).await {
                Ok(cache) => ports.cache = Arc::new(cache),
                Err(e) => {
                    tracing::error!("Failed to connect to Redis: {}. Using in-memory cache.", e)
                }
            }
        }

        #[cfg(feature = "postgres")]
        let db = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let conn = Arc::new(connections);
                    ports.users = Arc::new(PostgresUserRepository::new(conn.main.clone()));
                    ports.posts = Arc::new(PostgresPostRepository::new(conn.main.clone()));
                    ports.subscriptions =
                        Arc::new(PostgresNewsletterRepository::new(conn.main.clone()));
                    Some(conn)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                None
            }
        };

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory repositories");

        #[cfg(feature = "integrations")]
        Self::wire_integrations(config, &mut ports);

        let state = Self::from_ports(
            ports,
            config.admin.clone(),
            &config.admin_email,
            CookieSettings {
                secure: config.cookie_secure,
            },
            &config.site_url,
        );

        tracing::info!("Application state initialized");

        #[cfg(feature = "postgres")]
        let state = Self { db, ..state };

        state
    }

    #[cfg(feature = "integrations")]
    fn wire_integrations(config: &AppConfig, ports: &mut Ports) {
        use thriftx_infra::integrations::{CloudinaryImageHost, EmailJsMailer, NominatimGeocoder};

        match config.cloudinary.clone().map(CloudinaryImageHost::new) {
            Some(Ok(host)) => ports.image_host = Arc::new(host),
            Some(Err(e)) => tracing::error!(error = %e, "Failed to build Cloudinary client"),
            None => tracing::warn!("Cloudinary not configured - image uploads disabled"),
        }

        match config.emailjs.clone().map(EmailJsMailer::new) {
            Some(Ok(mailer)) => ports.mailer = Arc::new(mailer),
            Some(Err(e)) => tracing::error!(error = %e, "Failed to build EmailJS client"),
            None => tracing::warn!("EmailJS not configured - contact form disabled"),
        }

        match NominatimGeocoder::new(config.nominatim.clone()) {
            Ok(geocoder) => ports.geocoder = Arc::new(geocoder),
            Err(e) => tracing::error!(error = %e, "Failed to build Nominatim client"),
        }
    }

    /// Assemble the services over the given adapters.
    pub fn from_ports(
        ports: Ports,
        admin: AdminCredentials,
        admin_email: &str,
        cookies: CookieSettings,
        site_url: &str,
    ) -> Self {
        let sessions = Arc::new(SessionAuthority::new(
            ports.tokens,
            ports.cache.clone(),
            admin_email,
        ));

        Self {
            accounts: Arc::new(AccountService::new(
                ports.users,
                ports.passwords,
                sessions.clone(),
                admin,
            )),
            content: Arc::new(ContentService::new(ports.posts, ports.cache)),
            newsletter: Arc::new(NewsletterService::new(ports.subscriptions)),
            contact: Arc::new(ContactService::new(ports.geocoder, ports.mailer)),
            media: Arc::new(MediaService::new(ports.image_host)),
            sessions,
            cookies,
            site_url: Arc::from(site_url),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
