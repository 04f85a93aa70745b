//! Read-through caches keyed by entity id.
//!
//! Handlers consult the cache before storage and populate it on a miss.
//! The `EntityCache` trait is the only thing they see, so the moka-backed
//! TTL cache used in production can be swapped for a plain map in tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::RwLock;

use crate::config::CacheConfig;

#[async_trait]
pub trait EntityCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: i64) -> Option<V>;

    async fn put(&self, id: i64, value: V);

    async fn remove(&self, id: i64);
}

/// Entries expire after a fixed time-to-live or after sitting idle, whichever comes first
pub struct TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    cache: Cache<i64, V>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, max_capacity: u64, ttl: Duration, idle: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .time_to_idle(idle)
            .build();
        Self { name, cache }
    }

    pub fn from_config(name: &'static str, config: &CacheConfig) -> Self {
        Self::new(name, config.max_capacity, config.ttl(), config.idle())
    }
}

#[async_trait]
impl<V> EntityCache<V> for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: i64) -> Option<V> {
        let hit = self.cache.get(&id).await;
        if hit.is_some() {
            tracing::debug!(cache = self.name, id, "cache hit");
        }
        hit
    }

    async fn put(&self, id: i64, value: V) {
        self.cache.insert(id, value).await;
    }

    async fn remove(&self, id: i64) {
        self.cache.invalidate(&id).await;
    }
}

/// Unbounded map without expiry
pub struct MapCache<V> {
    entries: RwLock<HashMap<i64, V>>,
}

impl<V> Default for MapCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> MapCache<V> {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl<V> EntityCache<V> for MapCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: i64) -> Option<V> {
        self.entries.read().await.get(&id).cloned()
    }

    async fn put(&self, id: i64, value: V) {
        self.entries.write().await.insert(id, value);
    }

    async fn remove(&self, id: i64) {
        self.entries.write().await.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ttl_cache_round_trip() {
        let cache: TtlCache<String> =
            TtlCache::new("lessons", 100, Duration::from_secs(300), Duration::from_secs(300));
        assert!(cache.get(1).await.is_none());

        cache.put(1, "intro".to_string()).await;
        assert_eq!(cache.get(1).await.as_deref(), Some("intro"));

        cache.remove(1).await;
        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test]
    async fn ttl_cache_expires_entries() {
        let cache: TtlCache<u32> =
            TtlCache::new("activities", 100, Duration::from_millis(50), Duration::from_secs(300));
        cache.put(7, 42).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get(7).await.is_none());
    }

    #[tokio::test]
    async fn map_cache_overwrites_on_put() {
        let cache = MapCache::default();
        cache.put(3, "old").await;
        cache.put(3, "new").await;
        assert_eq!(cache.get(3).await, Some("new"));
        assert_eq!(cache.len().await, 1);
    }
}
