//! Session cookies and the caller extractor.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};

use thriftx_core::ports::{ADMIN_SESSION_TTL, USER_SESSION_TTL};
use thriftx_core::services::Principal;

use crate::state::{AppState, CookieSettings};

/// Cookie holding the user session token.
pub const USER_COOKIE: &str = "auth_token";

/// Cookie holding the admin session token.
pub const ADMIN_COOKIE: &str = "admin_token";

/// The resolved caller of a request, derived from both session cookies.
///
/// Never fails on bad cookies; they resolve to an anonymous caller.
/// ```ignore
/// async fn create(caller: Caller) -> AppResult<HttpResponse> {
///     caller.require_admin()?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl std::ops::Deref for Caller {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.0
    }
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let user_token = cookie_value(req, USER_COOKIE);
        let admin_token = cookie_value(req, ADMIN_COOKIE);

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(actix_web::error::ErrorInternalServerError(
                    "Server configuration error",
                ));
            };

            let principal = state
                .sessions
                .authorize(user_token.as_deref(), admin_token.as_deref())
                .await;
            Ok(Caller(principal))
        })
    }
}

/// Raw value of a cookie, if present and non-empty.
pub fn cookie_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.cookie(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn max_age(ttl: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

fn build_cookie(
    name: &'static str,
    value: String,
    max_age: time::Duration,
    settings: CookieSettings,
) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .max_age(max_age)
        .finish()
}

/// User session cookie, valid as long as the token.
pub fn user_session_cookie(token: String, settings: CookieSettings) -> Cookie<'static> {
    build_cookie(USER_COOKIE, token, max_age(USER_SESSION_TTL), settings)
}

/// Admin session cookie, valid as long as the token.
pub fn admin_session_cookie(token: String, settings: CookieSettings) -> Cookie<'static> {
    build_cookie(ADMIN_COOKIE, token, max_age(ADMIN_SESSION_TTL), settings)
}

/// An expired, empty cookie that makes the browser drop `name`.
pub fn removal_cookie(name: &'static str, settings: CookieSettings) -> Cookie<'static> {
    build_cookie(name, String::new(), time::Duration::ZERO, settings)
}
