//! End-to-end HTTP tests against the in-memory wiring.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use thriftx_core::ports::{
    AuthError, ContactEmail, Coordinates, Geocoder, ImageHost, IntegrationError, Mailer,
    PasswordService,
};
use thriftx_core::services::AdminCredentials;
use thriftx_infra::{JwtConfig, JwtTokenService};

use crate::handlers::configure_routes;
use crate::middleware::auth::{ADMIN_COOKIE, USER_COOKIE};
use crate::observability::RequestIdMiddleware;
use crate::state::{AppState, CookieSettings, Ports};

const ADMIN_EMAIL: &str = "owner@thriftx.com";

struct FixedGeocoder(Option<Coordinates>);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, IntegrationError> {
        Ok(self.0.clone())
    }
}

struct OkMailer;

#[async_trait]
impl Mailer for OkMailer {
    async fn send(&self, _email: &ContactEmail) -> Result<(), IntegrationError> {
        Ok(())
    }
}

struct DownMailer;

#[async_trait]
impl Mailer for DownMailer {
    async fn send(&self, _email: &ContactEmail) -> Result<(), IntegrationError> {
        Err(IntegrationError::Upstream {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

struct FakeImageHost;

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, bytes: Vec<u8>, _content_type: &str) -> Result<String, IntegrationError> {
        Ok(format!("https://img.test/{}.png", bytes.len()))
    }
}

/// Skips Argon2, which is slow in unoptimized test builds.
struct PrefixedPasswords;

impl PasswordService for PrefixedPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}

fn ports() -> Ports {
    let mut adapters = Ports::in_memory(Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        issuer: "thriftx-test".to_string(),
    })));
    adapters.passwords = Arc::new(PrefixedPasswords);
    adapters
}

fn state_from(ports: Ports) -> AppState {
    AppState::from_ports(
        ports,
        AdminCredentials {
            username: "admin".to_string(),
            password: "letmein!".to_string(),
        },
        ADMIN_EMAIL,
        CookieSettings { secure: false },
        "https://thriftx.test",
    )
}

fn state() -> AppState {
    let mut adapters = ports();
    adapters.geocoder = Arc::new(FixedGeocoder(Some(Coordinates {
        latitude: 40.5,
        longitude: -74.25,
    })));
    adapters.mailer = Arc::new(OkMailer);
    adapters.image_host = Arc::new(FakeImageHost);
    state_from(adapters)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

fn cookie_named<B>(res: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

macro_rules! signup {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "email": $email, "password": "password123" }))
            .to_request();
        test::call_service(&$app, req).await
    }};
}

macro_rules! login {
    ($app:expr, $email:expr $(, $cookie:expr)*) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            $(.cookie($cookie))*
            .set_json(json!({ "email": $email, "password": "password123" }))
            .to_request();
        test::call_service(&$app, req).await
    }};
}

macro_rules! admin_cookie {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({ "username": "admin", "password": "letmein!" }))
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        cookie_named(&res, ADMIN_COOKIE).unwrap()
    }};
}

#[actix_web::test]
async fn test_health() {
    let app = app!(state());
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("x-request-id", "req-123"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.headers().get("x-request-id").unwrap(), "req-123");

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let res = test::call_service(&app, req).await;
    let generated = res.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[actix_web::test]
async fn test_signup_is_case_insensitively_unique() {
    let app = app!(state());

    let res = signup!(app, "Shopper@Example.com");
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["email"], "shopper@example.com");

    let res = signup!(app, "  SHOPPER@example.COM ");
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_signup_accepts_plus_address_but_newsletter_does_not() {
    let app = app!(state());

    let res = signup!(app, "jo+shop@gmail.com");
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/newsletter")
        .set_json(json!({ "email": "jo+shop@gmail.com" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_signup_rejects_short_password() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": "a@b.com", "password": "short" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = app!(state());
    signup!(app, "a@b.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "a@b.com", "password": "wrong-password" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["detail"], "Invalid credentials");
}

#[actix_web::test]
async fn test_admin_email_login_grants_admin() {
    let app = app!(state());
    signup!(app, ADMIN_EMAIL);

    let res = login!(app, ADMIN_EMAIL);
    assert_eq!(res.status(), StatusCode::OK);
    let user = cookie_named(&res, USER_COOKIE).unwrap();
    let admin = cookie_named(&res, ADMIN_COOKIE).unwrap();
    assert!(!admin.value().is_empty());
    assert_eq!(user.http_only(), Some(true));

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(user)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
}

#[actix_web::test]
async fn test_me_is_anonymous_with_garbage_cookies() {
    let app = app!(state());
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(Cookie::new(USER_COOKIE, "not-a-token"))
        .cookie(Cookie::new(ADMIN_COOKIE, "still-not-a-token"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"], Value::Null);
    assert_eq!(body["isAdmin"], false);
}

#[actix_web::test]
async fn test_replayed_admin_cookie_is_rejected_after_non_admin_login() {
    let app = app!(state());
    let old_admin = admin_cookie!(app);
    signup!(app, "shopper@example.com");

    let res = login!(app, "shopper@example.com", old_admin.clone());
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = cookie_named(&res, ADMIN_COOKIE).unwrap();
    assert_eq!(cleared.value(), "");
    let user = cookie_named(&res, USER_COOKIE).unwrap();

    // Replay the old admin cookie alongside the new user session.
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(user)
        .cookie(old_admin.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isAdmin"], false);

    let req = test::TestRequest::get()
        .uri("/api/admin/me")
        .cookie(old_admin)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["admin"], Value::Null);
}

#[actix_web::test]
async fn test_logout_clears_cookies_and_revokes_admin() {
    let app = app!(state());
    let admin = admin_cookie!(app);

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .cookie(admin.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(cookie_named(&res, USER_COOKIE).unwrap().value(), "");
    assert_eq!(cookie_named(&res, ADMIN_COOKIE).unwrap().value(), "");

    let req = test::TestRequest::get()
        .uri("/api/admin/me")
        .cookie(admin)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["admin"], Value::Null);
}

#[actix_web::test]
async fn test_admin_login_rejects_wrong_password() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(json!({ "username": "admin", "password": "nope" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(cookie_named(&res, ADMIN_COOKIE).is_none());
}

#[actix_web::test]
async fn test_post_mutations_require_admin() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "t", "author": "a", "body": "b" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_anonymous_malformed_mutations_are_unauthorized() {
    let app = app!(state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("not json")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("title=x")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/uploads")
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0u8; 11 * 1024 * 1024])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_admin_malformed_body_is_bad_request() {
    let app = app!(state());
    let admin = admin_cookie!(app);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(admin.clone())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("not json")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/uploads")
        .cookie(admin)
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0u8; 11 * 1024 * 1024])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::PAYLOAD_TOO_LARGE
    );
}

#[actix_web::test]
async fn test_create_prefers_body_over_content() {
    let app = app!(state());
    let admin = admin_cookie!(app);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(admin)
        .set_json(json!({
            "title": "Both",
            "author": "Ana",
            "body": "<p>body</p>",
            "content": "<p>content</p>"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["body"], "<p>body</p>");
}

#[actix_web::test]
async fn test_create_normalizes_tags_and_shows_in_list() {
    let app = app!(state());
    let admin = admin_cookie!(app);

    // Prime the cached list view.
    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(admin)
        .set_json(json!({
            "title": " Denim week ",
            "author": "Ana",
            "content": "<p>Jackets</p>",
            "date": "2024-03-01",
            "tags": "a, b ,b"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["title"], "Denim week");
    assert_eq!(created["tags"], json!(["a", "b", "b"]));

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(
        res.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, s-maxage=300, stale-while-revalidate=600"
    );
    let listed: Vec<Value> = test::read_body_json(res).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
    assert!(listed[0].get("body").is_none());
}

#[actix_web::test]
async fn test_create_without_body_is_validation_error() {
    let app = app!(state());
    let admin = admin_cookie!(app);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(admin)
        .set_json(json!({ "title": "t", "author": "a" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_search_by_category_returns_only_that_post() {
    let app = app!(state());
    let admin = admin_cookie!(app);

    for (title, category) in [("One", "Footwear"), ("Two", "Outerwear"), ("Three", "")] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .cookie(admin.clone())
            .set_json(json!({
                "title": title,
                "author": "Ana",
                "body": "<p>x</p>",
                "category": category
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/posts?q=FOOTWEAR")
        .to_request();
    let hits: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"], "One");
    assert_eq!(hits[0]["body"], "<p>x</p>");
}

#[actix_web::test]
async fn test_update_then_read_returns_new_fields() {
    let app = app!(state());
    let admin = admin_cookie!(app);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(admin.clone())
        .set_json(json!({ "title": "Old", "author": "Ana", "body": "b", "tags": ["x"] }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/posts/{}", created["id"].as_str().unwrap());

    // Cache the detail view before changing it.
    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(admin)
        .set_json(json!({ "title": "New" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["title"], "New");
    assert_eq!(post["author"], "Ana");
    assert_eq!(post["tags"], json!(["x"]));
}

#[actix_web::test]
async fn test_delete_missing_post_is_not_found() {
    let app = app!(state());
    let admin = admin_cookie!(app);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
        .cookie(admin.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/api/posts/not-a-uuid")
        .cookie(admin)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_newsletter_subscribe_then_duplicate() {
    let app = app!(state());
    let subscribe = |email: &str| {
        test::TestRequest::post()
            .uri("/api/newsletter")
            .set_json(json!({ "email": email }))
            .to_request()
    };

    let res = test::call_service(&app, subscribe("Fan@Mail.com")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Successfully subscribed to newsletter!");

    let res = test::call_service(&app, subscribe("fan@mail.com")).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(&app, subscribe("not an email")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_contact_returns_coordinates() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({
            "name": "Sam",
            "email": "sam@shop.com",
            "message": "Hello",
            "storeAddress": "1 Main St"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["latitude"], 40.5);
    assert_eq!(body["longitude"], -74.25);
}

#[actix_web::test]
async fn test_contact_with_coordinates_skips_geocoder() {
    let mut adapters = ports();
    adapters.geocoder = Arc::new(FixedGeocoder(None));
    adapters.mailer = Arc::new(OkMailer);
    let app = app!(state_from(adapters));

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({
            "name": "Sam",
            "email": "sam+store@shop.com",
            "message": "Hello",
            "storeAddress": "nowhere at all",
            "latitude": 48.85,
            "longitude": 2.35
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["latitude"], 48.85);
    assert_eq!(body["longitude"], 2.35);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({
            "name": "Sam",
            "email": "sam@shop.com",
            "message": "Hello",
            "storeAddress": "nowhere at all",
            "latitude": 123.0,
            "longitude": 2.35
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_contact_unknown_address_and_mail_outage() {
    let mut adapters = ports();
    adapters.geocoder = Arc::new(FixedGeocoder(None));
    adapters.mailer = Arc::new(OkMailer);
    let app = app!(state_from(adapters));

    let form = json!({
        "name": "Sam",
        "email": "sam@shop.com",
        "message": "Hello",
        "storeAddress": "nowhere at all"
    });
    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(&form)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["detail"], "Address not found. Try a more specific address.");

    let mut adapters = ports();
    adapters.geocoder = Arc::new(FixedGeocoder(Some(Coordinates {
        latitude: 1.0,
        longitude: 2.0,
    })));
    adapters.mailer = Arc::new(DownMailer);
    let app = app!(state_from(adapters));
    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(&form)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn test_upload_requires_admin_and_image() {
    let app = app!(state());

    let req = test::TestRequest::post()
        .uri("/api/uploads")
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![1u8, 2, 3])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let admin = admin_cookie!(app);
    let req = test::TestRequest::post()
        .uri("/api/uploads")
        .cookie(admin.clone())
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/uploads")
        .cookie(admin)
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![1u8, 2, 3])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["url"], "https://img.test/3.png");
}

#[actix_web::test]
async fn test_upload_without_image_host_is_internal_error() {
    let app = app!(state_from(ports()));
    let admin = admin_cookie!(app);

    let req = test::TestRequest::post()
        .uri("/api/uploads")
        .cookie(admin)
        .insert_header((header::CONTENT_TYPE, "image/jpeg"))
        .set_payload(vec![0xFFu8, 0xD8])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[actix_web::test]
async fn test_sitemap_is_xml() {
    let app = app!(state());
    let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    let body = test::read_body(res).await;
    let xml = std::str::from_utf8(&body).unwrap();
    assert!(xml.contains("<loc>https://thriftx.test/blog</loc>"));
}
