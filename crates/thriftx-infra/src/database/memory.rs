//! In-memory repositories - used when the database is not configured.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use thriftx_core::domain::{NewsletterSubscription, Post, PostSummary, User};
use thriftx_core::error::RepoError;
use thriftx_core::ports::{
    BaseRepository, NewsletterRepository, PostRepository, UserRepository,
};

/// Rows keyed by id. `unique_key` extracts a column that must not repeat.
struct Table<T> {
    rows: RwLock<HashMap<Uuid, T>>,
    id_of: fn(&T) -> Uuid,
    unique_key: Option<fn(&T) -> &str>,
}

impl<T: Clone> Table<T> {
    fn new(id_of: fn(&T) -> Uuid, unique_key: Option<fn(&T) -> &str>) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            id_of,
            unique_key,
        }
    }

    async fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.values().find(|row| pred(row)).cloned()
    }

    async fn insert(&self, row: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        let id = (self.id_of)(&row);
        if rows.contains_key(&id) {
            return Err(RepoError::Constraint(format!("duplicate id {id}")));
        }
        if let Some(key_of) = self.unique_key {
            let key = key_of(&row);
            if rows.values().any(|existing| key_of(existing) == key) {
                return Err(RepoError::Constraint("duplicate unique key".to_string()));
            }
        }
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, row: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .get_mut(&(self.id_of)(&row))
            .ok_or(RepoError::NotFound)?;
        *slot = row.clone();
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

macro_rules! delegate_base_repository {
    ($repo:ty, $entity:ty) => {
        #[async_trait]
        impl BaseRepository<$entity, Uuid> for $repo {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<$entity>, RepoError> {
                Ok(self.table.get(id).await)
            }

            async fn insert(&self, entity: $entity) -> Result<$entity, RepoError> {
                self.table.insert(entity).await
            }

            async fn update(&self, entity: $entity) -> Result<$entity, RepoError> {
                self.table.update(entity).await
            }

            async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
                self.table.delete(id).await
            }
        }
    };
}

fn user_id(user: &User) -> Uuid {
    user.id
}

fn user_email(user: &User) -> &str {
    &user.email
}

/// In-memory user repository with a unique email column.
pub struct InMemoryUserRepository {
    table: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(user_id, Some(user_email)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

delegate_base_repository!(InMemoryUserRepository, User);

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.table.find(|u| u.email == email).await)
    }
}

fn post_id(post: &Post) -> Uuid {
    post.id
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    table: Table<Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(post_id, None),
        }
    }

    async fn newest_first(&self, pred: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .table
            .rows
            .read()
            .await
            .values()
            .filter(|p| pred(p))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

delegate_base_repository!(InMemoryPostRepository, Post);

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_summaries(&self) -> Result<Vec<PostSummary>, RepoError> {
        Ok(self
            .newest_first(|_| true)
            .await
            .iter()
            .map(Post::summary)
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        Ok(self.newest_first(|p| p.matches(query)).await)
    }
}

fn subscription_id(sub: &NewsletterSubscription) -> Uuid {
    sub.id
}

fn subscription_email(sub: &NewsletterSubscription) -> &str {
    &sub.email
}

/// In-memory newsletter repository with a unique email column.
pub struct InMemoryNewsletterRepository {
    table: Table<NewsletterSubscription>,
}

impl InMemoryNewsletterRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(subscription_id, Some(subscription_email)),
        }
    }
}

impl Default for InMemoryNewsletterRepository {
    fn default() -> Self {
        Self::new()
    }
}

delegate_base_repository!(InMemoryNewsletterRepository, NewsletterSubscription);

#[async_trait]
impl NewsletterRepository for InMemoryNewsletterRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<NewsletterSubscription>, RepoError> {
        Ok(self.table.find(|s| s.email == email).await)
    }
}
