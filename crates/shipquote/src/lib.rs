//! shipquote - multi-date carrier rate quotation
//!
//! Quotes a window of ship dates through the carrier's rating gateway,
//! reuses cached responses for identical requests, and returns the latest
//! usable quote.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use shipquote::models::config::ShipquoteConfig;
//! use shipquote::models::shipment::ShipmentContext;
//! use shipquote::engine::Quoter;
//! ```

pub use shipquote_cache as cache;
pub use shipquote_engine as engine;
pub use shipquote_models as models;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shipquote_cache::{MemoryCache, ResponseCache, SqliteStore, TieredCache, MAX_TTL};
use shipquote_engine::{EngineError, HttpTransport, Quoter, TracingSink};
use shipquote_models::config::{CacheConfig, ShipquoteConfig};
use shipquote_models::quote::QuoteOutcome;
use shipquote_models::shipment::ShipmentContext;
use tracing::{info, warn};

/// Build a Quoter wired to the live gateway from configuration.
pub fn build_quoter(config: &ShipquoteConfig) -> Result<Quoter, anyhow::Error> {
    let cache = build_cache(&config.cache)?;
    let transport = HttpTransport::new(Duration::from_secs(config.engine.request_timeout_seconds))
        .context("Failed to build HTTP client")?;

    let quoter = Quoter::new(
        Arc::new(transport),
        cache,
        Arc::new(TracingSink),
        config.carrier.clone(),
        &config.engine,
    )?;
    info!(
        endpoint = %quoter.endpoint(),
        sandbox = config.carrier.sandbox_mode,
        "Quoter ready"
    );
    Ok(quoter)
}

/// Memory-only cache, or SQLite-backed tiers when a path is configured.
pub fn build_cache(config: &CacheConfig) -> Result<Arc<dyn ResponseCache>, anyhow::Error> {
    for (field, seconds) in [
        ("memory_ttl_seconds", config.memory_ttl_seconds),
        ("ttl_seconds", config.ttl_seconds),
    ] {
        anyhow::ensure!(
            seconds <= MAX_TTL.as_secs(),
            "cache.{field} = {seconds} exceeds the maximum of {} seconds",
            MAX_TTL.as_secs()
        );
    }
    let memory_ttl = Duration::from_secs(config.memory_ttl_seconds);

    let Some(path) = &config.sqlite_path else {
        return Ok(Arc::new(MemoryCache::new(
            config.memory_max_capacity,
            memory_ttl,
        )));
    };

    let sqlite =
        SqliteStore::open(path).with_context(|| format!("Failed to open cache DB: {path}"))?;
    let tiered = TieredCache::new(
        sqlite,
        config.memory_max_capacity,
        memory_ttl,
        Duration::from_secs(config.ttl_seconds),
    );
    match tiered.purge_expired() {
        Ok(0) => {}
        Ok(purged) => info!(purged, "Purged expired cached responses"),
        Err(e) => warn!(error = %e, "Failed to purge expired cached responses"),
    }
    Ok(Arc::new(tiered))
}

/// Quote a shipment using the given quoter.
pub async fn quote(quoter: &Quoter, ctx: &ShipmentContext) -> Result<QuoteOutcome, EngineError> {
    quoter.quote(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_CONFIG: &str = include_str!("../../../config/shipquote.example.toml");

    fn config_with(sqlite_path: Option<String>) -> ShipquoteConfig {
        let mut config: ShipquoteConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        config.cache.sqlite_path = sqlite_path;
        config
    }

    #[test]
    fn example_config_parses() {
        let config: ShipquoteConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.carrier.sandbox_mode);
        assert_eq!(config.engine.look_forward_days, 5);
        assert_eq!(config.cache.ttl_seconds, 86_400);
    }

    #[tokio::test]
    async fn memory_only_quoter() {
        let quoter = build_quoter(&config_with(None)).unwrap();
        assert_eq!(
            quoter.endpoint().as_str(),
            "https://xmlpitest-ea.dhl.com/XMLShippingServlet"
        );
    }

    #[tokio::test]
    async fn sqlite_backed_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.db").to_str().unwrap().to_string();
        let config = config_with(Some(path.clone()));

        let first = build_cache(&config.cache).unwrap();
        first.set("<req/>", "<res/>").await.unwrap();
        drop(first);

        let second = build_cache(&config.cache).unwrap();
        assert_eq!(second.get("<req/>").await.unwrap().as_deref(), Some("<res/>"));
        assert!(std::path::Path::new(&path).exists());
    }

    #[test]
    fn out_of_range_ttl_is_rejected() {
        let mut config = config_with(None);
        config.cache.ttl_seconds = 10_000_000_000_000;
        let err = build_cache(&config.cache).err().unwrap();
        assert!(err.to_string().contains("cache.ttl_seconds"));

        let mut config = config_with(None);
        config.cache.memory_ttl_seconds = u64::MAX;
        let err = build_quoter(&config).err().unwrap();
        assert!(err.to_string().contains("cache.memory_ttl_seconds"));
    }

    #[tokio::test]
    async fn bad_gateway_url_fails_to_build() {
        let mut config = config_with(None);
        config.carrier.sandbox_url = "::not-a-url".to_string();
        let err = build_quoter(&config).err().unwrap();
        assert!(err.to_string().contains("invalid gateway URL"));
    }
}
