use kurz_core::{CacheError, ShortCode, UrlCache};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// TTL applied to every entry written through the layer.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Settings for a [`CacheLayer`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct CacheSettings {
    /// Time-to-live applied uniformly to every entry.
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,
    /// Upper bound on a single adapter call. An expired call counts as a
    /// failure and is treated like any other cache failure.
    #[builder(default, setter(strip_option))]
    pub timeout: Option<Duration>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A snapshot of cache layer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Adapter failures and timeouts across get, put and evict.
    pub errors: u64,
}

impl CacheStats {
    /// Fraction of lookups answered by the cache, in `[0.0, 1.0]`.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

/// Failure-isolating front for a [`UrlCache`] adapter.
///
/// The cache is a disposable projection of the store, so nothing here ever
/// returns an error:
///
/// - **Get**: a hit returns the value; an adapter error or timeout is logged
///   and reported as a miss.
/// - **Put**: writes with the configured TTL; failures are logged and dropped.
/// - **Evict**: removes the entry; failures are logged and dropped.
#[derive(Debug)]
pub struct CacheLayer<C> {
    adapter: C,
    settings: CacheSettings,
    counters: Arc<Counters>,
}

impl<C: Clone> Clone for CacheLayer<C> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            settings: self.settings,
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<C: UrlCache> CacheLayer<C> {
    /// Wraps `adapter` with default settings (15 minute TTL, no timeout).
    pub fn new(adapter: C) -> Self {
        Self::with_settings(adapter, CacheSettings::default())
    }

    pub fn with_settings(adapter: C, settings: CacheSettings) -> Self {
        Self {
            adapter,
            settings,
            counters: Arc::default(),
        }
    }

    /// Returns a reference to the wrapped adapter.
    pub fn adapter(&self) -> &C {
        &self.adapter
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Returns the cached original URL, or `None` on miss or failure.
    pub async fn get(&self, code: &ShortCode) -> Option<String> {
        trace!(code = %code, "cache lookup");

        match self.bounded(self.adapter.get_url(code)).await {
            Ok(Some(url)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(code = %code, "cache hit");
                Some(url)
            }
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(code = %code, "cache miss");
                None
            }
            Err(e) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(code = %code, error = %e, "cache unavailable on get, treating as miss");
                None
            }
        }
    }

    /// Writes the mapping with the configured TTL. Best-effort.
    pub async fn put(&self, code: &ShortCode, original_url: &str) {
        let ttl = self.settings.ttl;
        match self
            .bounded(self.adapter.set_url(code, original_url, ttl))
            .await
        {
            Ok(()) => debug!(code = %code, ttl_secs = ttl.as_secs(), "cached mapping"),
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(code = %code, error = %e, "cache unavailable on put, skipping");
            }
        }
    }

    /// Removes the entry for `code`. Best-effort.
    pub async fn evict(&self, code: &ShortCode) {
        match self.bounded(self.adapter.del(code)).await {
            Ok(()) => debug!(code = %code, "evicted cache entry"),
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(code = %code, error = %e, "cache unavailable on evict, skipping");
            }
        }
    }

    /// Returns the counters accumulated since the layer was created.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| CacheError::Timeout(format!("no response within {limit:?}")))?,
            None => call.await,
        }
    }
}
