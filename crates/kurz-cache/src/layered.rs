use async_trait::async_trait;
use kurz_core::{CacheError, ShortCode, UrlCache};
use std::time::Duration;
use tracing::{debug, trace};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A multi-layer cache that composes two cache implementations.
///
/// L1 is typically a fast, local cache (e.g., Moka in-memory cache) and
/// L2 is typically a slower, shared cache (e.g., Redis).
///
/// # Operation Strategy
///
/// - **Get**: Try L1 first, if miss try L2. If L2 has the value, populate L1
///   with it using `backfill_ttl`.
/// - **Set**: Write to both L2 and L1 with the same TTL.
/// - **Delete**: Remove from both L1 and L2.
///
/// Errors from either layer are returned as-is; a
/// [`CacheLayer`](crate::CacheLayer) in front decides what a failure means.
#[derive(Debug, Clone)]
pub struct LayeredCache<L1, L2> {
    l1: L1,
    l2: L2,
    backfill_ttl: Duration,
}

impl<L1, L2> LayeredCache<L1, L2> {
    /// Creates a new layered cache.
    ///
    /// # Arguments
    ///
    /// * `l1` - The primary/faster cache
    /// * `l2` - The secondary/slower cache
    /// * `backfill_ttl` - TTL for entries copied from L2 into L1. L2 does not
    ///   report the remaining lifetime of an entry, so keep this short.
    pub fn new(l1: L1, l2: L2, backfill_ttl: Duration) -> Self {
        Self {
            l1,
            l2,
            backfill_ttl,
        }
    }

    /// Returns a reference to the L1 cache.
    pub fn l1(&self) -> &L1 {
        &self.l1
    }

    /// Returns a reference to the L2 cache.
    pub fn l2(&self) -> &L2 {
        &self.l2
    }
}

#[async_trait]
impl<L1, L2> UrlCache for LayeredCache<L1, L2>
where
    L1: UrlCache,
    L2: UrlCache,
{
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching original URL from layered cache");

        if let Some(url) = self.l1.get_url(code).await? {
            debug!(code = %code, "L1 cache hit");
            return Ok(Some(url));
        }
        trace!(code = %code, "L1 cache miss, trying L2");

        match self.l2.get_url(code).await? {
            Some(url) => {
                debug!(code = %code, "L2 cache hit, backfilling L1");
                self.l1.set_url(code, &url, self.backfill_ttl).await?;
                Ok(Some(url))
            }
            None => {
                trace!(code = %code, "L2 cache miss");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, "Storing original URL in layered cache");

        // Write to L2 first (shared), then L1
        self.l2.set_url(code, original_url, ttl).await?;
        self.l1.set_url(code, original_url, ttl).await?;
        debug!(code = %code, "Stored in L1 and L2 caches");

        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, "Removing original URL from layered cache");

        self.l1.del(code).await?;
        self.l2.del(code).await?;
        debug!(code = %code, "Removed from L1 and L2 caches");

        Ok(())
    }
}
