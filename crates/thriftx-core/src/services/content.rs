//! Blog post lifecycle: list, search, read, create, update, delete.
//!
//! Reads go through the cache; every mutation invalidates the `posts` tag so
//! the next read observes it without waiting for the TTL.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostChanges, PostSummary};
use crate::error::{DomainError, RepoError};
use crate::ports::{Cache, PostRepository};

use super::session::Principal;

/// Cache tag shared by every cached post view.
pub const POSTS_CACHE_TAG: &str = "posts";

const LIST_CACHE_KEY: &str = "posts:list";
const LIST_TTL: Duration = Duration::from_secs(300);
const DETAIL_TTL: Duration = Duration::from_secs(600);

/// Parse a post id from a path segment. Malformed ids cannot exist, so they
/// are reported as not found.
pub fn parse_post_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DomainError::not_found("Post", raw))
}

pub struct ContentService {
    posts: Arc<dyn PostRepository>,
    cache: Arc<dyn Cache>,
}

impl ContentService {
    pub fn new(posts: Arc<dyn PostRepository>, cache: Arc<dyn Cache>) -> Self {
        Self { posts, cache }
    }

    /// Summaries of every post, newest first.
    pub async fn list(&self) -> Result<Vec<PostSummary>, DomainError> {
        if let Some(hit) = self.cached(LIST_CACHE_KEY).await {
            return Ok(hit);
        }
        let summaries = self.posts.list_summaries().await?;
        self.store(LIST_CACHE_KEY, &summaries, LIST_TTL).await;
        Ok(summaries)
    }

    /// Full posts matching `query`, newest first. A blank query lists everything.
    pub async fn search(&self, query: &str) -> Result<Vec<Post>, DomainError> {
        let query = query.trim();
        Ok(self.posts.search(query).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        let key = detail_key(id);
        if let Some(hit) = self.cached(&key).await {
            return Ok(hit);
        }
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;
        self.store(&key, &post, DETAIL_TTL).await;
        Ok(post)
    }

    pub async fn create(&self, principal: &Principal, draft: NewPost) -> Result<Post, DomainError> {
        principal.require_admin()?;
        let post = Post::create(draft)?;
        let post = self.posts.insert(post).await?;

        tracing::info!(post_id = %post.id, title = %post.title, "Post created");
        self.invalidate().await;
        Ok(post)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        principal.require_admin()?;
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        post.apply(changes)?;
        let post = self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;

        tracing::info!(post_id = %id, "Post updated");
        self.invalidate().await;
        Ok(post)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        principal.require_admin()?;
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;

        tracing::info!(post_id = %id, "Post deleted");
        self.invalidate().await;
        Ok(())
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }
    }

    async fn store<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self
            .cache
            .set_tagged(key, &raw, Some(ttl), &[POSTS_CACHE_TAG])
            .await
        {
            tracing::warn!(key = %key, error = %e, "Failed to cache post view");
        }
    }

    async fn invalidate(&self) {
        if let Err(e) = self.cache.invalidate_tag(POSTS_CACHE_TAG).await {
            tracing::warn!(error = %e, "Failed to invalidate cached post views");
        }
    }
}

fn detail_key(id: Uuid) -> String {
    format!("posts:{id}")
}
