//! Admin login with the configured credentials.

use actix_web::{HttpRequest, HttpResponse, web};

use thriftx_core::error::DomainError;
use thriftx_shared::dto::{AdminLoginRequest, AdminMeResponse, AdminRole, OkResponse};

use crate::middleware::auth::{ADMIN_COOKIE, admin_session_cookie, cookie_value};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/admin/login
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<AdminLoginRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let stale_admin = cookie_value(&req, ADMIN_COOKIE);

    let token = state
        .accounts
        .admin_login(&body.username, &body.password, stale_admin.as_deref())
        .await
        .map_err(|e| match e {
            DomainError::Unauthorized => {
                AppError::Unauthorized("Invalid admin credentials".to_string())
            }
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok()
        .cookie(admin_session_cookie(token, state.cookies))
        .json(OkResponse { ok: true }))
}

/// GET /api/admin/me - admin cookie only, the user session is not consulted.
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let admin_token = cookie_value(&req, ADMIN_COOKIE);
    let admin = state
        .sessions
        .has_admin_session(admin_token.as_deref())
        .await
        .then(|| AdminRole {
            role: "admin".to_string(),
        });

    HttpResponse::Ok().json(AdminMeResponse { admin })
}
