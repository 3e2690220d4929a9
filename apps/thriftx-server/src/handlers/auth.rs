//! Account handlers: signup, login, logout and the current caller.

use actix_web::{HttpRequest, HttpResponse, web};

use thriftx_core::error::DomainError;
use thriftx_core::services::SessionUser;
use thriftx_shared::dto::{LoginRequest, MeResponse, OkResponse, SignupRequest, UserResponse};

use crate::middleware::auth::{
    ADMIN_COOKIE, Caller, USER_COOKIE, admin_session_cookie, cookie_value, removal_cookie,
    user_session_cookie,
};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: SessionUser) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        email: user.email,
    }
}

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state.accounts.signup(&req.email, &req.password).await?;

    Ok(HttpResponse::Created().json(UserResponse {
        id: user.id.to_string(),
        email: user.email,
    }))
}

/// POST /api/auth/login
///
/// Always replaces the admin cookie: reissued for the admin account, cleared
/// for everyone else.
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let stale_admin = cookie_value(&req, ADMIN_COOKIE);

    let session = state
        .accounts
        .login(&body.email, &body.password, stale_admin.as_deref())
        .await
        .map_err(|e| match e {
            DomainError::Unauthorized => AppError::Unauthorized("Invalid credentials".to_string()),
            other => other.into(),
        })?;

    let is_admin = session.admin_token.is_some();
    let mut response = HttpResponse::Ok();
    response.cookie(user_session_cookie(session.user_token, state.cookies));
    match session.admin_token {
        Some(token) => response.cookie(admin_session_cookie(token, state.cookies)),
        None => response.cookie(removal_cookie(ADMIN_COOKIE, state.cookies)),
    };

    Ok(response.json(MeResponse {
        user: Some(UserResponse {
            id: session.user.id.to_string(),
            email: session.user.email,
        }),
        is_admin,
    }))
}

/// POST /api/auth/logout
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let admin_token = cookie_value(&req, ADMIN_COOKIE);
    state.accounts.logout(admin_token.as_deref()).await;

    HttpResponse::Ok()
        .cookie(removal_cookie(USER_COOKIE, state.cookies))
        .cookie(removal_cookie(ADMIN_COOKIE, state.cookies))
        .json(OkResponse { ok: true })
}

/// GET /api/auth/me
pub async fn me(caller: Caller) -> HttpResponse {
    let Caller(principal) = caller;
    HttpResponse::Ok().json(MeResponse {
        user: principal.user.map(user_response),
        is_admin: principal.is_admin,
    })
}
