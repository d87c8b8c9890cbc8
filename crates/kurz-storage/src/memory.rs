use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use kurz_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use kurz_core::{ShortCode, StorageError};
use tracing::trace;

/// In-memory implementation of the repository traits using DashMap.
///
/// Mappings are held twice: keyed by original URL (the primary copy, used
/// for deduplication) and keyed by short code (the code index). Unindexed
/// lookups scan the primary copy instead of using the index.
///
/// `save` claims the URL slot and then the code slot while holding the shard
/// lock of the former, so two concurrent saves of the same URL cannot both
/// succeed.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    by_url: DashMap<String, UrlMapping>,
    by_code: DashMap<ShortCode, UrlMapping>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_url: DashMap::with_capacity(capacity),
            by_code: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        Ok(self.by_url.get(original_url).map(|m| m.value().clone()))
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self.by_code.get(code).map(|m| m.value().clone()))
    }

    async fn find_by_code_unindexed(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        trace!(code = %code, rows = self.by_url.len(), "scanning mappings");
        Ok(self
            .by_url
            .iter()
            .find(|m| m.value().code == *code)
            .map(|m| m.value().clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, mapping: UrlMapping) -> Result<UrlMapping> {
        // Lock order is always by_url then by_code.
        let url_slot = match self.by_url.entry(mapping.original_url.clone()) {
            Entry::Occupied(_) => return Err(StorageError::DuplicateUrl(mapping.original_url)),
            Entry::Vacant(slot) => slot,
        };

        match self.by_code.entry(mapping.code.clone()) {
            Entry::Occupied(_) => return Err(StorageError::DuplicateCode(mapping.code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(mapping.clone());
            }
        }

        url_slot.insert(mapping.clone());
        Ok(mapping)
    }
}
