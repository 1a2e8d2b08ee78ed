//! Storage gateway trait

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single persisted entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Bytes,
    /// Host hint for seal-wrapped storage; vaultmock never sets it
    pub seal_wrap: bool,
}

impl StorageEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            seal_wrap: false,
        }
    }
}

/// Key-value persistence supplied by the host.
///
/// Implementations provide per-key atomicity for every call. The backend
/// never uses multi-key transactions and never caches entries.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Fetch an entry. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError>;

    /// Insert or overwrite an entry
    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError>;

    /// Remove an entry. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List keys under a prefix, relative to it and sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
