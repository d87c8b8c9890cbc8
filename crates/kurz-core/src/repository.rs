use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored mapping between a short code and the URL it stands for.
///
/// Mappings are immutable once saved. Both `code` and `original_url` are
/// unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// The identifier the code was encoded from.
    pub id: u64,
    /// The short code handed out to users.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
}

/// A read-only view of the durable store.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Looks up the mapping created for `original_url`, if any.
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>>;

    /// Looks up the mapping for a short code through the code index.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Looks up the mapping for a short code without using the code index.
    ///
    /// Exists for latency comparison only and returns the same answer as
    /// [`find_by_code`](ReadRepository::find_by_code).
    async fn find_by_code_unindexed(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        self.find_by_code(code).await
    }
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Persists a new mapping atomically.
    ///
    /// Returns `Err(DuplicateUrl)` if the original URL is already mapped and
    /// `Err(DuplicateCode)` if the code is already taken. Nothing is written
    /// in either case.
    async fn save(&self, mapping: UrlMapping) -> Result<UrlMapping>;
}

#[async_trait]
impl<T: ReadRepository + ?Sized> ReadRepository for Arc<T> {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        (**self).find_by_original_url(original_url).await
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        (**self).find_by_code(code).await
    }

    async fn find_by_code_unindexed(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        (**self).find_by_code_unindexed(code).await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn save(&self, mapping: UrlMapping) -> Result<UrlMapping> {
        (**self).save(mapping).await
    }
}
