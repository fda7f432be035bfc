use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::CacheError;
use crate::memory::MemoryCache;
use crate::sqlite::SqliteStore;
use crate::store::{ResponseCache, MAX_TTL};

/// Two-tier response cache: moka (hot, per process) over SQLite (shared, persistent).
///
/// Reads check moka first and promote SQLite hits into it. Writes go to
/// SQLite first, then moka, so a crashed process never leaves a response
/// only in memory. A promoted entry can outlive its row by at most the hot
/// tier's TTL.
///
/// `rusqlite::Connection` is not `Sync`, hence the `Mutex`.
pub struct TieredCache {
    hot: MemoryCache,
    persistent: Mutex<SqliteStore>,
    ttl: chrono::Duration,
}

impl TieredCache {
    /// Both lifetimes are capped at [`MAX_TTL`].
    pub fn new(sqlite: SqliteStore, max_entries: u64, memory_ttl: Duration, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl.min(MAX_TTL))
            .unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            hot: MemoryCache::new(max_entries, memory_ttl),
            persistent: Mutex::new(sqlite),
            ttl,
        }
    }

    /// Drop expired rows from the persistent tier.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        self.persistent()?.purge_expired()
    }

    /// Entries currently held in the hot tier.
    pub async fn hot_len(&self) -> u64 {
        self.hot.len().await
    }

    fn persistent(&self) -> Result<MutexGuard<'_, SqliteStore>, CacheError> {
        self.persistent
            .lock()
            .map_err(|e| CacheError::Unavailable(format!("SQLite mutex poisoned: {e}")))
    }
}

#[async_trait]
impl ResponseCache for TieredCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(body) = self.hot.lookup(key).await {
            return Ok(Some(body));
        }

        // Guard dropped before the await below.
        let row = self.persistent()?.get(key)?;
        let Some(row) = row else {
            return Ok(None);
        };

        debug!(key_len = key.len(), "Promoting persisted response to hot cache");
        self.hot
            .store(key.to_string(), row.response_body.clone())
            .await;
        Ok(Some(row.response_body))
    }

    async fn set(&self, key: &str, body: &str) -> Result<(), CacheError> {
        self.persistent()?.set(key, body, self.ttl)?;
        self.hot.store(key.to_string(), body.to_string()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_cache() -> TieredCache {
        let sqlite = SqliteStore::open_in_memory().unwrap();
        sqlite
            .set("<req day=1/>", "<res day=1/>", chrono::Duration::seconds(300))
            .unwrap();
        TieredCache::new(
            sqlite,
            100,
            Duration::from_secs(60),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn read_through_sqlite_to_moka() {
        let cache = setup_cache();
        assert_eq!(cache.hot_len().await, 0);

        let body = cache.get("<req day=1/>").await.unwrap();
        assert_eq!(body.as_deref(), Some("<res day=1/>"));

        assert_eq!(
            cache.hot.lookup("<req day=1/>").await.as_deref(),
            Some("<res day=1/>")
        );
        assert_eq!(cache.hot_len().await, 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let cache = setup_cache();
        assert!(cache.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_writes_both_tiers() {
        let cache = setup_cache();
        cache.set("<req day=2/>", "<res day=2/>").await.unwrap();

        assert_eq!(
            cache.hot.lookup("<req day=2/>").await.as_deref(),
            Some("<res day=2/>")
        );
        let row = cache.persistent().unwrap().get("<req day=2/>").unwrap();
        assert_eq!(row.unwrap().response_body, "<res day=2/>");
    }

    #[tokio::test]
    async fn repeated_hits_do_not_extend_lifetime() {
        let cache = TieredCache::new(
            SqliteStore::open_in_memory().unwrap(),
            100,
            Duration::from_millis(300),
            Duration::from_millis(300),
        );
        cache.set("<req/>", "<res/>").await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        let hit = cache.get("<req/>").await.unwrap().unwrap();
        cache.set("<req/>", &hit).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get("<req/>").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_ttl_does_not_overflow() {
        let cache = TieredCache::new(
            SqliteStore::open_in_memory().unwrap(),
            100,
            Duration::from_secs(10_000_000_000_000),
            Duration::from_secs(10_000_000_000_000),
        );
        cache.set("<req/>", "<res/>").await.unwrap();
        assert_eq!(cache.get("<req/>").await.unwrap().as_deref(), Some("<res/>"));
    }

    #[tokio::test]
    async fn purge_leaves_live_rows() {
        let cache = setup_cache();
        assert_eq!(cache.purge_expired().unwrap(), 0);
        assert!(cache.get("<req day=1/>").await.unwrap().is_some());
    }
}
