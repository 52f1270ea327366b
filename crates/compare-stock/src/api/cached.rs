//! Caching decorator for any fundamentals source

use async_trait::async_trait;
use std::time::Duration;

use super::FundamentalsSource;
use crate::cache::{CacheKey, StockCache};
use crate::error::Result;
use crate::snapshot::FinancialSnapshot;

/// Wraps a source so repeated lookups within the TTL skip the network
pub struct CachedSource<S> {
    inner: S,
    cache: StockCache<FinancialSnapshot>,
}

impl<S: FundamentalsSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: StockCache::new(ttl),
        }
    }

    /// Share an existing cache
    pub fn with_cache(inner: S, cache: StockCache<FinancialSnapshot>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &StockCache<FinancialSnapshot> {
        &self.cache
    }
}

#[async_trait]
impl<S: FundamentalsSource> FundamentalsSource for CachedSource<S> {
    async fn fetch(&self, symbol: &str) -> Result<FinancialSnapshot> {
        let key = CacheKey::new(symbol, self.inner.name());
        self.cache
            .get_or_fetch(key, || self.inner.fetch(symbol))
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FundamentalsSource for CountingSource {
        async fn fetch(&self, symbol: &str) -> Result<FinancialSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FinancialSnapshot::new(symbol))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let source = CachedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(60),
        );

        let first = source.fetch("AAPL").await.unwrap();
        let second = source.fetch("AAPL").await.unwrap();
        source.fetch("TSLA").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.cache().len().await, 2);
        assert_eq!(source.name(), "counting");
    }
}
