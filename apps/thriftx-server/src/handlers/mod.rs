//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod body;
mod contact;
mod health;
mod newsletter;
mod posts;
mod sitemap;
mod uploads;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/sitemap.xml", web::get().to(sitemap::sitemap))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/newsletter", web::post().to(newsletter::subscribe))
            .route("/contact", web::post().to(contact::submit))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/admin")
                    .route("/login", web::post().to(admin::login))
                    .route("/me", web::get().to(admin::me)),
            )
            // Content routes - mutations require an admin session
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list))
                    .route(web::post().to(posts::create)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(posts::get))
                    .route(web::put().to(posts::update))
                    .route(web::delete().to(posts::delete)),
            )
            .service(
                web::resource("/uploads").route(web::post().to(uploads::upload)),
            ),
    );
}
