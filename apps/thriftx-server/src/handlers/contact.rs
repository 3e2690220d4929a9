//! Contact form submission.

use actix_web::{HttpResponse, web};

use thriftx_core::services::ContactForm;
use thriftx_shared::dto::{ContactRequest, ContactResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/contact
pub async fn submit(
    state: web::Data<AppState>,
    body: web::Json<ContactRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let location = state
        .contact
        .submit(ContactForm {
            name: req.name,
            email: req.email,
            message: req.message,
            store_address: req.store_address,
            latitude: req.latitude,
            longitude: req.longitude,
        })
        .await?;

    Ok(HttpResponse::Ok().json(ContactResponse {
        ok: true,
        latitude: location.latitude,
        longitude: location.longitude,
    }))
}
