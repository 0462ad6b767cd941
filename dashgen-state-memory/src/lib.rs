#![deny(missing_docs)]
//! In-memory implementation of the [`HistoryStore`] trait.
//!
//! Uses a `HashMap` behind a `RwLock` for concurrent access. Entries are
//! keyed by id; listing sorts by creation time, newest first.

use async_trait::async_trait;
use dashgen_types::{HistoryEntry, HistoryPage, HistoryQuery, HistoryStore, StorageError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory history store backed by a `HashMap` behind a `RwLock`.
///
/// Suitable for testing and single-process use where history does not need
/// to survive a restart.
pub struct MemoryHistoryStore {
    entries: RwLock<HashMap<String, HistoryEntry>>,
}

impl MemoryHistoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get(&self, id: &str) -> Result<Option<HistoryEntry>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries.get(id).cloned())
    }

    async fn put(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.remove(id);
        Ok(())
    }

    async fn list(&self, query: HistoryQuery) -> Result<HistoryPage, StorageError> {
        let mut sorted: Vec<HistoryEntry> = self.entries.read().await.values().cloned().collect();
        // Ties broken by id so paging is stable.
        sorted.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(HistoryPage::paginate(sorted, query))
    }
}
