use kurz_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("short code not found: {0}")]
    NotFound(String),
    /// The store could not be reached or did not answer in time.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),
    /// The store answered but rejected the call or returned unusable data.
    #[error("store failure: {0}")]
    Store(#[source] StorageError),
    /// Two identifiers encoded to a code that is already stored. The
    /// allocator or the encoder is broken.
    #[error("short code collision for {0}")]
    CodeCollision(String),
    #[error("store is inconsistent: {0}")]
    Inconsistent(String),
}

impl EngineError {
    /// Whether the same call may succeed if the caller tries again.
    pub fn is_retriable(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable(_))
    }
}

impl From<StorageError> for EngineError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Unavailable(_) | StorageError::Timeout(_) => {
                EngineError::StoreUnavailable(error)
            }
            _ => EngineError::Store(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failures_are_retriable() {
        for error in [
            StorageError::Unavailable("refused".into()),
            StorageError::Timeout("slow".into()),
        ] {
            let error = EngineError::from(error);
            assert!(matches!(error, EngineError::StoreUnavailable(_)));
            assert!(error.is_retriable());
        }
    }

    #[test]
    fn rejected_calls_are_not_retriable() {
        for error in [
            StorageError::Query("Data too long for column 'original_url'".into()),
            StorageError::InvalidData("row 7 holds a bad short code".into()),
            StorageError::Operation("unexpected".into()),
        ] {
            let error = EngineError::from(error);
            assert!(matches!(error, EngineError::Store(_)));
            assert!(!error.is_retriable());
        }
    }
}
