use crate::Result;
use async_trait::async_trait;
use kurz_cache::CacheStats;
use kurz_core::ShortCode;

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Cache,
    Store,
    StoreUnindexed,
}

impl LookupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupSource::Cache => "cache",
            LookupSource::Store => "store",
            LookupSource::StoreUnindexed => "store_unindexed",
        }
    }
}

/// Store access path for cache-bypassing lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreLookup {
    Indexed,
    Unindexed,
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub original_url: String,
    pub source: LookupSource,
}

/// Operations the engine exposes to request handlers.
#[async_trait]
pub trait UrlResolver: Send + Sync + 'static {
    /// Returns the short code for `original_url`, creating it on first use.
    async fn create_short_url(&self, original_url: &str) -> Result<ShortCode>;

    /// Resolves a short code through the cache, falling back to the store.
    async fn resolve(&self, code: &ShortCode) -> Result<Resolved>;

    /// Resolves a short code straight from the store, bypassing the cache.
    async fn resolve_via_store_only(&self, code: &ShortCode, lookup: StoreLookup)
        -> Result<Resolved>;

    /// Drops the cached entry for `code`, if any.
    async fn evict(&self, code: &ShortCode);

    fn cache_stats(&self) -> CacheStats;
}
