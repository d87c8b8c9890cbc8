use crate::error::{EngineError, Result};
use crate::resolver::{LookupSource, Resolved, StoreLookup, UrlResolver};
use async_trait::async_trait;
use kurz_allocator::IdAllocator;
use kurz_cache::{CacheLayer, CacheStats};
use kurz_core::{base62, Repository, ShortCode, StorageError, UrlCache, UrlMapping};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace};
use typed_builder::TypedBuilder;

/// Tunables for a [`ResolutionEngine`].
#[derive(Debug, Clone, Copy, Default, TypedBuilder)]
pub struct EngineSettings {
    /// Upper bound on a single store call. Expiry surfaces as
    /// [`EngineError::StoreUnavailable`] wrapping [`StorageError::Timeout`].
    #[builder(default, setter(strip_option))]
    pub store_timeout: Option<Duration>,
}

/// How a `save` ended once duplicate-URL conflicts are accounted for.
enum SaveOutcome {
    Inserted(UrlMapping),
    /// A concurrent creator stored the same URL first; this is its mapping.
    ConflictResolved(UrlMapping),
}

/// Creates and resolves short codes.
///
/// The repository is the single source of truth. The cache sits in front of
/// it for lookups only and is never allowed to fail a call.
pub struct ResolutionEngine<R, C, A> {
    repository: Arc<R>,
    cache: CacheLayer<C>,
    allocator: Arc<A>,
    settings: EngineSettings,
}

impl<R, C: Clone, A> Clone for ResolutionEngine<R, C, A> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: self.cache.clone(),
            allocator: Arc::clone(&self.allocator),
            settings: self.settings,
        }
    }
}

impl<R: Repository, C: UrlCache, A: IdAllocator> ResolutionEngine<R, C, A> {
    pub fn new(repository: R, cache: CacheLayer<C>, allocator: A) -> Self {
        Self::with_settings(repository, cache, allocator, EngineSettings::default())
    }

    pub fn with_settings(
        repository: R,
        cache: CacheLayer<C>,
        allocator: A,
        settings: EngineSettings,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            cache,
            allocator: Arc::new(allocator),
            settings,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &CacheLayer<C> {
        &self.cache
    }

    /// Returns the short code for `original_url`, creating a mapping if the
    /// URL has not been shortened before.
    ///
    /// Concurrent calls with the same URL all return the same code; the
    /// store's uniqueness on the original URL decides the winner.
    pub async fn create_short_url(&self, original_url: &str) -> Result<ShortCode> {
        if let Some(existing) = self
            .bounded(self.repository.find_by_original_url(original_url))
            .await?
        {
            debug!(code = %existing.code, "url already shortened");
            return Ok(existing.code);
        }

        let id = self.allocator.next_id();
        let mapping = UrlMapping {
            id,
            code: base62::encode(id),
            original_url: original_url.to_string(),
        };

        match self.persist(mapping).await? {
            SaveOutcome::Inserted(mapping) => {
                info!(code = %mapping.code, id = mapping.id, "created short url");
                Ok(mapping.code)
            }
            SaveOutcome::ConflictResolved(winner) => {
                debug!(code = %winner.code, id, "lost creation race, returning existing code");
                Ok(winner.code)
            }
        }
    }

    /// Resolves `code` cache-first, repopulating the cache on a store hit.
    pub async fn resolve(&self, code: &ShortCode) -> Result<Resolved> {
        trace!(code = %code, "resolving short code");

        if let Some(original_url) = self.cache.get(code).await {
            return Ok(Resolved {
                original_url,
                source: LookupSource::Cache,
            });
        }

        let mapping = self
            .bounded(self.repository.find_by_code(code))
            .await?
            .ok_or_else(|| {
                debug!(code = %code, "short code not found");
                EngineError::NotFound(code.to_string())
            })?;

        self.cache.put(code, &mapping.original_url).await;

        Ok(Resolved {
            original_url: mapping.original_url,
            source: LookupSource::Store,
        })
    }

    /// Resolves `code` from the store alone. The cache is neither read nor
    /// written.
    pub async fn resolve_via_store_only(
        &self,
        code: &ShortCode,
        lookup: StoreLookup,
    ) -> Result<Resolved> {
        trace!(code = %code, ?lookup, "resolving short code from store only");

        let (found, source) = match lookup {
            StoreLookup::Indexed => (
                self.bounded(self.repository.find_by_code(code)).await?,
                LookupSource::Store,
            ),
            StoreLookup::Unindexed => (
                self.bounded(self.repository.find_by_code_unindexed(code))
                    .await?,
                LookupSource::StoreUnindexed,
            ),
        };

        let mapping = found.ok_or_else(|| EngineError::NotFound(code.to_string()))?;
        Ok(Resolved {
            original_url: mapping.original_url,
            source,
        })
    }

    /// Drops the cached entry for `code`.
    pub async fn evict(&self, code: &ShortCode) {
        self.cache.evict(code).await;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn persist(&self, mapping: UrlMapping) -> Result<SaveOutcome> {
        let original_url = mapping.original_url.clone();

        match self.bounded(self.repository.save(mapping)).await {
            Ok(saved) => Ok(SaveOutcome::Inserted(saved)),
            Err(StorageError::DuplicateUrl(_)) => {
                match self
                    .bounded(self.repository.find_by_original_url(&original_url))
                    .await?
                {
                    Some(winner) => Ok(SaveOutcome::ConflictResolved(winner)),
                    None => Err(EngineError::Inconsistent(format!(
                        "save reported a duplicate url but no mapping exists for {original_url}"
                    ))),
                }
            }
            Err(StorageError::DuplicateCode(code)) => {
                error!(code = %code, "generated short code already exists");
                Err(EngineError::CodeCollision(code))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, StorageError>>,
    ) -> std::result::Result<T, StorageError> {
        match self.settings.store_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| StorageError::Timeout(format!("no response within {limit:?}")))?,
            None => call.await,
        }
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache, A: IdAllocator> UrlResolver for ResolutionEngine<R, C, A> {
    async fn create_short_url(&self, original_url: &str) -> Result<ShortCode> {
        ResolutionEngine::create_short_url(self, original_url).await
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Resolved> {
        ResolutionEngine::resolve(self, code).await
    }

    async fn resolve_via_store_only(
        &self,
        code: &ShortCode,
        lookup: StoreLookup,
    ) -> Result<Resolved> {
        ResolutionEngine::resolve_via_store_only(self, code, lookup).await
    }

    async fn evict(&self, code: &ShortCode) {
        ResolutionEngine::evict(self, code).await
    }

    fn cache_stats(&self) -> CacheStats {
        ResolutionEngine::cache_stats(self)
    }
}
