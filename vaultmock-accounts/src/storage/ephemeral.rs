//! In-memory ephemeral storage backend

use super::traits::*;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

struct InMemoryEntry {
    value: Bytes,
    seal_wrap: bool,
}

/// Ephemeral (in-memory) storage backend
pub struct EphemeralStorage {
    entries: DashMap<String, InMemoryEntry>,
}

impl Default for EphemeralStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl EphemeralStorage {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StorageGateway for EphemeralStorage {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError> {
        Ok(self.entries.get(key).map(|entry| StorageEntry {
            key: key.to_string(),
            value: entry.value.clone(),
            seal_wrap: entry.seal_wrap,
        }))
    }

    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError> {
        self.entries.insert(
            entry.key,
            InMemoryEntry {
                value: entry.value,
                seal_wrap: entry.seal_wrap,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter_map(|r| r.key().strip_prefix(prefix).map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }
}
