use async_trait::async_trait;
use kurz_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use kurz_core::{ShortCode, StorageError};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::{debug, trace};

/// Schema for the `url_mappings` table.
pub const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

const SHORT_CODE_KEY: &str = "uk_url_mappings_short_code";
const PRIMARY_KEY: &str = "PRIMARY";

/// MySQL implementation of the repository contract.
///
/// A single `url_mappings` table is the source of truth. Uniqueness of the
/// original URL is enforced through a stored SHA-256 column because the URL
/// itself is too long for a unique index. Unindexed lookups force a full
/// table scan with `IGNORE INDEX` on the same table.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("url_mappings schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

/// MySQL names the violated key only in the message:
/// `Duplicate entry '...' for key 'url_mappings.uk_url_mappings_short_code'`.
fn violated_key(err: &sqlx::Error) -> Option<&str> {
    let message = err.as_database_error()?.message();
    let start = message.rfind("for key '")? + "for key '".len();
    let key = message[start..].trim_end_matches('\'');
    Some(key.rsplit('.').next().unwrap_or(key))
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn map_row(row: MySqlRow) -> Result<UrlMapping> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;

    let code = ShortCode::new(code)
        .map_err(|e| StorageError::InvalidData(format!("row {id} holds a bad short code: {e}")))?;

    Ok(UrlMapping {
        id,
        code,
        original_url,
    })
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT id, short_code, original_url
            FROM url_mappings
            WHERE original_url_hash = UNHEX(SHA2(?, 256))
              AND original_url = ?
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(map_row).transpose()
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT id, short_code, original_url
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(map_row).transpose()
    }

    async fn find_by_code_unindexed(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        trace!(code = %code, "full scan lookup");

        let row = sqlx::query(
            r#"
            SELECT id, short_code, original_url
            FROM url_mappings IGNORE INDEX (uk_url_mappings_short_code)
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(map_row).transpose()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn save(&self, mapping: UrlMapping) -> Result<UrlMapping> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (id, short_code, original_url)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(mapping.id)
        .bind(mapping.code.as_str())
        .bind(mapping.original_url.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(mapping),
            Err(err) if is_unique_violation(&err) => match violated_key(&err) {
                Some(SHORT_CODE_KEY) | Some(PRIMARY_KEY) => {
                    Err(StorageError::DuplicateCode(mapping.code.to_string()))
                }
                _ => Err(StorageError::DuplicateUrl(mapping.original_url)),
            },
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_both_unique_keys() {
        assert!(SCHEMA.contains(SHORT_CODE_KEY));
        assert!(SCHEMA.contains("uk_url_mappings_original_url_hash"));
    }

    #[test]
    fn pool_timeouts_map_to_timeout() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
    }

    #[test]
    fn closed_pool_maps_to_unavailable() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
    }
}
