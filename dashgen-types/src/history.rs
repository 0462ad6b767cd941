//! Storage seam for previously generated dashboards.
//!
//! The streaming core never touches storage. Callers that want a history
//! inject a [`HistoryStore`] and write to it from their completion handler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::request::GenerationRequest;
use crate::summary::GenerationSummary;

/// Default page size for [`HistoryQuery`].
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A generated dashboard together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique id.
    pub id: String,
    /// The request the dashboard was generated from.
    pub config: GenerationRequest,
    /// The generated document.
    pub generated_html: String,
    /// Statistics about the generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<GenerationSummary>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry with a fresh id, stamped now.
    #[must_use]
    pub fn new(config: GenerationRequest, generated_html: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            generated_html: generated_html.into(),
            summary: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a generation summary.
    #[must_use]
    pub fn with_summary(mut self, summary: GenerationSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Which page of history to list. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Page number, starting at 1.
    pub page: usize,
    /// Entries per page.
    pub size: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl HistoryQuery {
    /// Query a specific page.
    #[must_use]
    pub fn page(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Number of entries to skip. Page 0 is treated as page 1.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.size)
    }
}

/// One page of history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Entries on this page.
    pub data: Vec<HistoryEntry>,
    /// Total entries in the store.
    pub total: usize,
    /// The page returned.
    pub page: usize,
    /// Requested page size.
    pub size: usize,
    /// Total number of pages.
    pub pages: usize,
}

impl HistoryPage {
    /// Slice an already newest-first list of entries into the requested page.
    #[must_use]
    pub fn paginate(sorted: Vec<HistoryEntry>, query: HistoryQuery) -> Self {
        let total = sorted.len();
        let pages = if query.size == 0 {
            0
        } else {
            total.div_ceil(query.size)
        };
        let data = sorted
            .into_iter()
            .skip(query.offset())
            .take(query.size)
            .collect();
        Self {
            data,
            total,
            page: query.page.max(1),
            size: query.size,
            pages,
        }
    }
}

/// Injected storage capability for generation history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch an entry by id. Returns `None` if it doesn't exist.
    async fn get(&self, id: &str) -> Result<Option<HistoryEntry>, StorageError>;

    /// Insert or replace an entry, keyed by its id.
    async fn put(&self, entry: HistoryEntry) -> Result<(), StorageError>;

    /// Delete an entry. No-op if it doesn't exist.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    /// List entries newest first.
    async fn list(&self, query: HistoryQuery) -> Result<HistoryPage, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ThemeConfig;

    fn entry(n: usize) -> HistoryEntry {
        let req = GenerationRequest::new("p", "grid", ThemeConfig::named("t"), vec!["kpi".into()]);
        HistoryEntry::new(req, format!("<html>{n}</html>"))
    }

    #[test]
    fn offset_is_one_based() {
        assert_eq!(HistoryQuery::page(1, 10).offset(), 0);
        assert_eq!(HistoryQuery::page(3, 10).offset(), 20);
        assert_eq!(HistoryQuery::page(0, 10).offset(), 0);
    }

    #[test]
    fn paginate_reports_totals() {
        let entries: Vec<_> = (0..25).map(entry).collect();
        let page = HistoryPage::paginate(entries, HistoryQuery::page(3, 10));
        assert_eq!(page.total, 25);
        assert_eq!(page.pages, 3);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.data[0].generated_html, "<html>20</html>");
    }

    #[test]
    fn page_past_end_is_empty() {
        let entries: Vec<_> = (0..3).map(entry).collect();
        let page = HistoryPage::paginate(entries, HistoryQuery::page(5, 10));
        assert!(page.data.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.pages, 1);
    }

    #[test]
    fn entries_get_unique_ids() {
        assert_ne!(entry(0).id, entry(0).id);
    }
}
