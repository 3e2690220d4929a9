//! Newsletter signup.

use actix_web::{HttpResponse, web};

use thriftx_core::services::SubscribeOutcome;
use thriftx_shared::dto::{MessageResponse, NewsletterRequest};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/newsletter
pub async fn subscribe(
    state: web::Data<AppState>,
    body: web::Json<NewsletterRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state.newsletter.subscribe(&body.email).await?;

    let (mut response, message) = match outcome {
        SubscribeOutcome::Subscribed => (
            HttpResponse::Created(),
            "Successfully subscribed to newsletter!",
        ),
        SubscribeOutcome::Resubscribed => {
            (HttpResponse::Ok(), "Successfully resubscribed to newsletter!")
        }
    };

    Ok(response.json(MessageResponse {
        message: message.to_string(),
    }))
}
