//! Newsletter signup with reactivation of lapsed subscriptions.

use std::sync::Arc;

use crate::domain::{EmailAddress, NewsletterSubscription};
use crate::error::{DomainError, RepoError};
use crate::ports::NewsletterRepository;

/// What a successful subscribe call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    Resubscribed,
}

pub struct NewsletterService {
    subscriptions: Arc<dyn NewsletterRepository>,
}

impl NewsletterService {
    pub fn new(subscriptions: Arc<dyn NewsletterRepository>) -> Self {
        Self { subscriptions }
    }

    /// Subscribe `email`, or reactivate it if it was previously unsubscribed.
    pub async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, DomainError> {
        let email = EmailAddress::parse_strict(email)?;

        if let Some(mut existing) = self.subscriptions.find_by_email(email.as_str()).await? {
            if existing.is_active {
                return Err(DomainError::Conflict(
                    "This email is already subscribed to our newsletter".to_string(),
                ));
            }
            existing.reactivate();
            self.subscriptions.update(existing).await?;
            tracing::info!(email = %email.masked(), "Newsletter subscription reactivated");
            return Ok(SubscribeOutcome::Resubscribed);
        }

        let masked = email.masked();
        self.subscriptions
            .insert(NewsletterSubscription::new(email))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => DomainError::Conflict(
                    "This email is already subscribed to our newsletter".to_string(),
                ),
                other => other.into(),
            })?;

        tracing::info!(email = %masked, "Newsletter subscription created");
        Ok(SubscribeOutcome::Subscribed)
    }
}
