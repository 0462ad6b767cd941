use chrono::{Duration, Utc};
use dashgen_state_memory::MemoryHistoryStore;
use dashgen_types::{GenerationRequest, HistoryEntry, HistoryQuery, HistoryStore, ThemeConfig};
use std::sync::Arc;

fn request(purpose: &str) -> GenerationRequest {
    GenerationRequest::new(purpose, "grid", ThemeConfig::named("Ocean"), vec!["kpi".into()])
}

/// Entry created `age_secs` seconds ago.
fn entry(purpose: &str, age_secs: i64) -> HistoryEntry {
    let mut entry = HistoryEntry::new(request(purpose), format!("<html>{purpose}</html>"));
    entry.created_at = Utc::now() - Duration::seconds(age_secs);
    entry
}

// --- Basic CRUD ---

#[tokio::test]
async fn put_then_get() {
    let store = MemoryHistoryStore::new();
    let e = entry("sales", 0);
    let id = e.id.clone();

    store.put(e.clone()).await.unwrap();

    assert_eq!(store.get(&id).await.unwrap(), Some(e));
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = MemoryHistoryStore::new();
    assert_eq!(store.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn put_same_id_replaces_entry() {
    let store = MemoryHistoryStore::new();
    let mut e = entry("sales", 0);
    store.put(e.clone()).await.unwrap();

    e.generated_html = "<html>v2</html>".into();
    store.put(e.clone()).await.unwrap();

    assert_eq!(store.len().await, 1);
    let stored = store.get(&e.id).await.unwrap().unwrap();
    assert_eq!(stored.generated_html, "<html>v2</html>");
}

#[tokio::test]
async fn delete_removes_entry() {
    let store = MemoryHistoryStore::new();
    let e = entry("sales", 0);
    store.put(e.clone()).await.unwrap();

    store.delete(&e.id).await.unwrap();

    assert_eq!(store.get(&e.id).await.unwrap(), None);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn delete_missing_is_noop() {
    let store = MemoryHistoryStore::new();
    store.delete("missing").await.unwrap();
}

// --- Listing ---

#[tokio::test]
async fn list_is_newest_first() {
    let store = MemoryHistoryStore::new();
    store.put(entry("old", 300)).await.unwrap();
    store.put(entry("new", 0)).await.unwrap();
    store.put(entry("mid", 100)).await.unwrap();

    let page = store.list(HistoryQuery::default()).await.unwrap();
    let purposes: Vec<_> = page.data.iter().map(|e| e.config.purpose.as_str()).collect();
    assert_eq!(purposes, vec!["new", "mid", "old"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.pages, 1);
}

#[tokio::test]
async fn list_pages_through_entries() {
    let store = MemoryHistoryStore::new();
    for i in 0..12 {
        store.put(entry(&format!("p{i}"), i)).await.unwrap();
    }

    let first = store.list(HistoryQuery::page(1, 5)).await.unwrap();
    let last = store.list(HistoryQuery::page(3, 5)).await.unwrap();

    assert_eq!(first.data.len(), 5);
    assert_eq!(first.data[0].config.purpose, "p0");
    assert_eq!(last.data.len(), 2);
    assert_eq!(last.data[1].config.purpose, "p11");
    assert_eq!(last.pages, 3);
}

#[tokio::test]
async fn list_empty_store() {
    let store = MemoryHistoryStore::new();
    let page = store.list(HistoryQuery::default()).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.pages, 0);
}

// --- Trait object + concurrency ---

#[tokio::test]
async fn usable_as_trait_object() {
    let store: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new());
    let e = entry("sales", 0);
    store.put(e.clone()).await.unwrap();
    assert!(store.get(&e.id).await.unwrap().is_some());
}

#[tokio::test]
async fn concurrent_puts() {
    let store = Arc::new(MemoryHistoryStore::new());
    let mut handles = Vec::new();
    for i in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.put(entry(&format!("p{i}"), i)).await.unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(store.len().await, 20);
}
