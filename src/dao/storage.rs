use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by the storage layer regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An operation referenced a row that does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend failed to read or commit.
    #[error("storage fault: {message}")]
    Fault {
        /// Human-readable description of the failure.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct a fault from any backend failure.
    pub fn fault(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Fault {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        let message = err.to_string();
        StorageError::Fault {
            message,
            source: Box::new(err),
        }
    }
}
