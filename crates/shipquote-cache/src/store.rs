use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Longest lifetime either tier accepts. Bounded well inside what moka and
/// chrono timestamps can represent.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Key/value store for carrier responses, keyed by the exact request text.
///
/// Writes for the same key are last-writer-wins; implementations only need
/// their own internal consistency. Rewriting an entry with the body it
/// already holds must not extend its lifetime.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, body: &str) -> Result<(), CacheError>;
}
