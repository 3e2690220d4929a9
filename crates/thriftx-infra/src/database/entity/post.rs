//! Post entity for SeaORM.

use sea_orm::{FromQueryResult, Set};
use sea_orm::entity::prelude::*;

use thriftx_core::domain::{Post, PostSummary};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub date: DateTimeWithTimeZone,
    pub author: String,
    /// HTML body.
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    /// JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn tags_from_json(value: Json) -> Vec<String> {
    match value {
        Json::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Json::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            date: model.date.into(),
            author: model.author,
            body: model.body,
            image_url: model.image_url,
            category: model.category,
            tags: tags_from_json(model.tags),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            date: Set(post.date.into()),
            author: Set(post.author),
            body: Set(post.body),
            image_url: Set(post.image_url),
            category: Set(post.category),
            tags: Set(Json::from(post.tags)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}

/// Projection used by the blog index.
#[derive(Debug, FromQueryResult)]
pub struct SummaryRow {
    pub id: Uuid,
    pub title: String,
    pub date: DateTimeWithTimeZone,
    pub author: String,
    pub image_url: Option<String>,
}

impl From<SummaryRow> for PostSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            date: row.date.into(),
            author: row.author,
            image_url: row.image_url,
        }
    }
}
