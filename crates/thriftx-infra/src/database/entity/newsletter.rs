//! Newsletter subscription entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use thriftx_core::domain::NewsletterSubscription;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "newsletter_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub subscribed_at: DateTimeWithTimeZone,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for NewsletterSubscription {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            subscribed_at: model.subscribed_at.into(),
            is_active: model.is_active,
        }
    }
}

impl From<NewsletterSubscription> for ActiveModel {
    fn from(sub: NewsletterSubscription) -> Self {
        Self {
            id: Set(sub.id),
            email: Set(sub.email),
            subscribed_at: Set(sub.subscribed_at.into()),
            is_active: Set(sub.is_active),
        }
    }
}
