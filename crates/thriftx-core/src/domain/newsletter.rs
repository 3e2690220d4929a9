use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EmailAddress;

/// Newsletter subscription - one record per email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub id: Uuid,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub is_active: bool,
}

impl NewsletterSubscription {
    pub fn new(email: EmailAddress) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into_inner(),
            subscribed_at: Utc::now(),
            is_active: true,
        }
    }

    /// Mark active again and refresh the subscription timestamp.
    pub fn reactivate(&mut self) {
        self.is_active = true;
        self.subscribed_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
