use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::error::CacheError;
use crate::store::{ResponseCache, MAX_TTL};

/// Per-process response cache backed by moka.
///
/// Keys are full request documents, values the raw carrier response. Used
/// alone when no persistent store is configured and as the hot tier of
/// [`crate::TieredCache`] otherwise.
///
/// Entry lifetimes count from the first store of a body; storing the same
/// body again is a no-op.
pub struct MemoryCache {
    responses: Cache<String, String>,
}

impl MemoryCache {
    /// `ttl` is capped at [`MAX_TTL`].
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            responses: Cache::builder()
                .name("shipquote-responses")
                .max_capacity(max_entries)
                .time_to_live(ttl.min(MAX_TTL))
                .build(),
        }
    }

    pub async fn lookup(&self, request: &str) -> Option<String> {
        self.responses.get(request).await
    }

    pub async fn store(&self, request: String, response: String) {
        if self.responses.get(&request).await.as_deref() == Some(response.as_str()) {
            return;
        }
        self.responses.insert(request, response).await;
    }

    /// Entry count after applying pending evictions.
    pub async fn len(&self) -> u64 {
        self.responses.run_pending_tasks().await;
        self.responses.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.lookup(key).await)
    }

    async fn set(&self, key: &str, body: &str) -> Result<(), CacheError> {
        self.store(key.to_string(), body.to_string()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = "<GetQuote><Date>2026-10-19</Date></GetQuote>";
    const RESPONSE: &str = "<GetQuoteResponse><QtdShp/></GetQuoteResponse>";

    #[tokio::test]
    async fn response_found_by_exact_request() {
        let cache = MemoryCache::new(100, Duration::from_secs(60));
        cache.store(REQUEST.to_string(), RESPONSE.to_string()).await;

        assert_eq!(cache.lookup(REQUEST).await.as_deref(), Some(RESPONSE));
        assert_eq!(cache.lookup(&format!("{REQUEST} ")).await, None);
    }

    #[tokio::test]
    async fn rewrite_keeps_last_value() {
        let cache = MemoryCache::new(100, Duration::from_secs(60));
        let store: &dyn ResponseCache = &cache;
        store.set(REQUEST, "<first/>").await.unwrap();
        store.set(REQUEST, "<second/>").await.unwrap();

        assert_eq!(store.get(REQUEST).await.unwrap().as_deref(), Some("<second/>"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn restoring_same_body_keeps_original_expiry() {
        let cache = MemoryCache::new(100, Duration::from_millis(300));
        cache.store(REQUEST.to_string(), RESPONSE.to_string()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        cache.store(REQUEST.to_string(), RESPONSE.to_string()).await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.lookup(REQUEST).await.is_none());
    }

    #[tokio::test]
    async fn new_body_starts_fresh_lifetime() {
        let cache = MemoryCache::new(100, Duration::from_millis(300));
        cache.store(REQUEST.to_string(), "<old/>".to_string()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        cache.store(REQUEST.to_string(), RESPONSE.to_string()).await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.lookup(REQUEST).await.as_deref(), Some(RESPONSE));
    }

    #[tokio::test]
    async fn oversized_ttl_is_capped() {
        let cache = MemoryCache::new(100, Duration::from_secs(u64::MAX / 2));
        cache.store(REQUEST.to_string(), RESPONSE.to_string()).await;
        assert!(cache.lookup(REQUEST).await.is_some());
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache = MemoryCache::new(2, Duration::from_secs(60));
        for day in 19..25 {
            cache
                .store(format!("<Date>2026-10-{day}</Date>"), RESPONSE.to_string())
                .await;
        }
        assert!(cache.len().await <= 2);
    }

    #[tokio::test]
    async fn responses_expire() {
        let cache = MemoryCache::new(100, Duration::from_millis(50));
        cache.store(REQUEST.to_string(), RESPONSE.to_string()).await;
        assert!(cache.lookup(REQUEST).await.is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.lookup(REQUEST).await.is_none());
        assert!(cache.is_empty().await);
    }
}
