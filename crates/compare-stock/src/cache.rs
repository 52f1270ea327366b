//! Time-bounded cache for fetched fundamentals

use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key: which source answered for which symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Stock symbol
    pub symbol: String,
    /// Source name
    pub source: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(symbol: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            source: source.into(),
        }
    }
}

/// Thread-safe cache whose entries expire after a fixed lifespan.
///
/// Clones share the same storage.
pub struct StockCache<V> {
    cache: Arc<RwLock<TimedCache<CacheKey, V>>>,
}

impl<V: Clone> StockCache<V> {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        // TimedCache evicts on read, so lookups need the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: V) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value, or run `fetcher` and cache its success.
    ///
    /// Errors are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for {} from {}", key.symbol, key.source);
            return Ok(value);
        }

        tracing::debug!("Cache miss for {} from {}", key.symbol, key.source);

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of live entries, evicting expired ones first
    pub async fn len(&self) -> usize {
        let mut cache = self.cache.write().await;
        cache.flush();
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V> Clone for StockCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(symbol: &str) -> CacheKey {
        CacheKey::new(symbol, "test")
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = StockCache::new(Duration::from_secs(60));
        cache.insert(key("AAPL"), 189.5_f64).await;

        assert_eq!(cache.get(&key("AAPL")).await, Some(189.5));
        assert_eq!(cache.get(&key("TSLA")).await, None);
        assert_eq!(cache.get(&CacheKey::new("AAPL", "other")).await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_counted() {
        let cache = StockCache::new(Duration::from_millis(20));
        cache.insert(key("AAPL"), 189.5_f64).await;
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.len().await, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_get_or_fetch() {
        let cache = StockCache::new(Duration::from_secs(60));
        let mut calls = 0;

        let value = cache
            .get_or_fetch(key("AAPL"), || {
                calls += 1;
                async { Ok::<_, String>(1.0_f64) }
            })
            .await
            .unwrap();
        assert_eq!(value, 1.0);

        let value = cache
            .get_or_fetch(key("AAPL"), || {
                calls += 1;
                async { Ok::<_, String>(2.0_f64) }
            })
            .await
            .unwrap();
        assert_eq!(value, 1.0);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: StockCache<f64> = StockCache::new(Duration::from_secs(60));

        let result = cache
            .get_or_fetch(key("AAPL"), || async { Err::<f64, _>("down") })
            .await;
        assert_eq!(result, Err("down"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_invalidation_and_clear() {
        let cache = StockCache::new(Duration::from_secs(60));
        for (i, symbol) in ["A", "B", "C"].iter().enumerate() {
            cache.insert(key(symbol), i).await;
        }
        assert_eq!(cache.len().await, 3);

        cache.invalidate(&key("B")).await;
        assert!(cache.get(&key("B")).await.is_none());
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = StockCache::new(Duration::from_secs(60));
        let other = cache.clone();
        other.insert(key("MC.PA"), "LVMH".to_string()).await;
        assert_eq!(cache.get(&key("MC.PA")).await.as_deref(), Some("LVMH"));
    }
}
