use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - a blog article authored by the site admin.
///
/// `body` is admin-authored HTML and is stored and served verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub author: String,
    pub body: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields shown in the blog index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub author: String,
    pub image_url: Option<String>,
}

/// Input for creating a post. Required fields are checked by [`Post::create`].
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Input for updating a post. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Post {
    /// Validate a draft and build a new post. The date defaults to now.
    pub fn create(draft: NewPost) -> Result<Self, DomainError> {
        let title = required(draft.title, "title")?;
        let author = required(draft.author, "author")?;
        let body = draft
            .body
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| DomainError::validation("Missing required fields: body"))?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            date: draft.date.unwrap_or(now),
            author,
            body,
            image_url: non_blank(draft.image_url),
            category: non_blank(draft.category),
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply an update in place. Present-but-blank required fields are rejected.
    pub fn apply(&mut self, changes: PostChanges) -> Result<(), DomainError> {
        if let Some(title) = changes.title {
            self.title = required(Some(title), "title")?;
        }
        if let Some(author) = changes.author {
            self.author = required(Some(author), "author")?;
        }
        if let Some(body) = changes.body {
            if body.trim().is_empty() {
                return Err(DomainError::validation("Missing required fields: body"));
            }
            self.body = body;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if changes.image_url.is_some() {
            self.image_url = non_blank(changes.image_url);
        }
        if changes.category.is_some() {
            self.category = non_blank(changes.category);
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            date: self.date,
            author: self.author.clone(),
            image_url: self.image_url.clone(),
        }
    }

    /// Case-insensitive substring match across title, author, body, category and tags.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(&needle);

        hit(&self.title)
            || hit(&self.author)
            || hit(&self.body)
            || self.category.as_deref().is_some_and(hit)
            || self.tags.iter().any(|t| hit(t))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::validation(format!("Missing required fields: {field}")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize the `tags` request field.
///
/// Accepts either a JSON array (non-string entries are dropped) or a single
/// comma-separated string. Entries are trimmed and empty ones removed; order
/// and duplicates are preserved.
pub fn normalize_tags(raw: &serde_json::Value) -> Vec<String> {
    let trimmed = |s: &str| {
        let t = s.trim();
        (!t.is_empty()).then(|| t.to_string())
    };

    match raw {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(serde_json::Value::as_str)
            .filter_map(trimmed)
            .collect(),
        serde_json::Value::String(csv) => csv.split(',').filter_map(trimmed).collect(),
        _ => Vec::new(),
    }
}

/// Parse a post date given as RFC 3339 or as a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_post_date(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DomainError::validation(format!("Invalid date: {raw}")))
}
