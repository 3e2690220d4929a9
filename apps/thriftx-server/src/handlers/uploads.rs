//! Image uploads.

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use thriftx_shared::dto::UploadResponse;

use super::body::read_limited;
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/uploads (admin) - raw image bytes, `Content-Type: image/*`.
pub async fn upload(
    req: HttpRequest,
    state: web::Data<AppState>,
    caller: Caller,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let body = read_limited(payload, MAX_UPLOAD_BYTES).await?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let url = state
        .media
        .upload_image(&caller, body.to_vec(), content_type)
        .await?;

    Ok(HttpResponse::Ok().json(UploadResponse { url }))
}
