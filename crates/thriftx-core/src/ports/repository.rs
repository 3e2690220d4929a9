use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewsletterSubscription, Post, PostSummary, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Fails with `Constraint` on a duplicate unique key.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Replace an existing entity. Fails with `NotFound` if it no longer exists.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Fails with `NotFound` if nothing was deleted.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts as index summaries, newest first.
    async fn list_summaries(&self) -> Result<Vec<PostSummary>, RepoError>;

    /// Posts matching `query` in title, author, body, category or tags
    /// (case-insensitive substring), newest first.
    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError>;
}

/// Newsletter subscription repository.
#[async_trait]
pub trait NewsletterRepository: BaseRepository<NewsletterSubscription, Uuid> {
    async fn find_by_email(&self, email: &str)
    -> Result<Option<NewsletterSubscription>, RepoError>;
}
