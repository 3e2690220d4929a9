//! In-memory cache implementation - used when Redis is not configured.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use thriftx_core::ports::{Cache, CacheError};

/// Smallest store size that triggers a sweep of expired entries.
const SWEEP_FLOOR: usize = 64;

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct Store {
    entries: HashMap<String, CacheEntry>,
    tags: HashMap<String, HashSet<String>>,
    /// Entry count at which the next insert sweeps.
    sweep_at: usize,
}

impl Store {
    /// Drop expired entries and tag links to keys that are gone.
    fn sweep(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !InMemoryCache::is_expired(entry));

        let entries = &self.entries;
        self.tags.retain(|_, keys| {
            keys.retain(|key| entries.contains_key(key));
            !keys.is_empty()
        });

        self.sweep_at = (self.entries.len() * 2).max(SWEEP_FLOOR);
        tracing::trace!(
            evicted = before - self.entries.len(),
            remaining = self.entries.len(),
            "Swept in-memory cache"
        );
    }
}

/// In-memory cache using a HashMap with async RwLock and a tag index.
///
/// Expired entries are dropped on read, and in bulk once the store doubles
/// in size since the last sweep.
///
/// Note: Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<Store>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
        }
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        entry
            .expires_at
            .map(|exp| Instant::now() > exp)
            .unwrap_or(false)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.entries.get(key)?;

        if Self::is_expired(entry) {
            drop(store);
            let mut store = self.store.write().await;
            store.entries.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.set_tagged(key, value, ttl, &[]).await
    }

    async fn set_tagged(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        tags: &[&str],
    ) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        if store.entries.len() >= store.sweep_at {
            store.sweep();
        }

        store.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        for tag in tags {
            store
                .tags
                .entry((*tag).to_string())
                .or_default()
                .insert(key.to_string());
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.entries.remove(key);
        Ok(())
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        if let Some(keys) = store.tags.remove(tag) {
            tracing::debug!(tag = %tag, keys = keys.len(), "Invalidating cache tag");
            for key in keys {
                store.entries.remove(&key);
            }
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        cache.delete("key1").await.unwrap();
        assert_eq!(cache.get("key1").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "lived", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!cache.exists("short").await);
    }

    #[tokio::test]
    async fn test_insert_sweeps_expired_entries_and_tags() {
        let cache = InMemoryCache::new();
        cache.set("keep", "1", None).await.unwrap();
        for i in 1..SWEEP_FLOOR {
            cache
                .set_tagged(&format!("posts:{i}"), "{}", Some(Duration::from_millis(10)), &["posts"])
                .await
                .unwrap();
        }
        assert_eq!(cache.store.read().await.entries.len(), SWEEP_FLOOR);

        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.set("fresh", "1", None).await.unwrap();

        let store = cache.store.read().await;
        assert_eq!(store.entries.len(), 2);
        assert!(store.entries.contains_key("keep"));
        assert!(!store.tags.contains_key("posts"));
    }

    #[tokio::test]
    async fn test_invalidate_tag_drops_only_tagged_keys() {
        let cache = InMemoryCache::new();
        cache
            .set_tagged("posts:list", "[]", None, &["posts"])
            .await
            .unwrap();
        cache
            .set_tagged("posts:1", "{}", None, &["posts"])
            .await
            .unwrap();
        cache.set("revoked:admin:x", "1", None).await.unwrap();

        cache.invalidate_tag("posts").await.unwrap();

        assert_eq!(cache.get("posts:list").await, None);
        assert_eq!(cache.get("posts:1").await, None);
        assert!(cache.exists("revoked:admin:x").await);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_tag_is_noop() {
        let cache = InMemoryCache::new();
        cache.set("a", "1", None).await.unwrap();
        cache.invalidate_tag("nothing").await.unwrap();
        assert!(cache.exists("a").await);
    }
}
