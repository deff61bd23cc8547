use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::formats::{BookSummary, BookmarkEntry};
use crate::storage::LocalStorage;

/// Storage key the bookmark map is persisted under.
pub const BOOKMARKS_KEY: &str = "bookmarks";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Persisted set of bookmarked books keyed by catalog id.
///
/// Every mutation rewrites the full map. Persistence is best-effort: a failed write is
/// logged and the in-memory state stays authoritative for the rest of the session.
#[derive(Debug)]
pub struct BookmarkStore {
    storage: LocalStorage,
    entries: BTreeMap<String, BookmarkEntry>,
}

impl BookmarkStore {
    pub fn load(storage: LocalStorage) -> Self {
        let entries = match storage.get(BOOKMARKS_KEY) {
            None => BTreeMap::new(),
            Some(value) => {
                match serde_json::from_value::<BTreeMap<String, BookmarkEntry>>(value) {
                    Ok(entries) => entries,
                    Err(err) => {
                        tracing::warn!(
                            path = %storage.path().display(),
                            %err,
                            "bookmark data is malformed; starting empty"
                        );
                        BTreeMap::new()
                    }
                }
            }
        };
        tracing::debug!(count = entries.len(), "loaded bookmarks");
        Self { storage, entries }
    }

    pub fn toggle(&mut self, book: &BookSummary) -> Toggled {
        let toggled = if self.entries.remove(&book.id).is_some() {
            Toggled::Removed
        } else {
            self.entries
                .insert(book.id.clone(), BookmarkEntry::from(book));
            Toggled::Added
        };
        tracing::info!(id = %book.id, ?toggled, "bookmark toggled");
        self.flush();
        toggled
    }

    pub fn remove(&mut self, id: &str) -> Option<BookmarkEntry> {
        let removed = self.entries.remove(id)?;
        tracing::info!(id, "bookmark removed");
        self.flush();
        Some(removed)
    }

    /// Forgets every bookmark and drops the key from storage.
    pub fn clear(&mut self) {
        self.entries.clear();
        tracing::info!("bookmarks cleared");
        if let Err(err) = self.storage.remove(BOOKMARKS_KEY) {
            tracing::warn!(
                path = %self.storage.path().display(),
                %err,
                "failed to clear stored bookmarks"
            );
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&BookmarkEntry> {
        self.entries.get(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &BookmarkEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn persist(&self) -> Result<(), StorageError> {
        let value = serde_json::to_value(&self.entries)?;
        self.storage.set(BOOKMARKS_KEY, value)
    }

    fn flush(&self) {
        if let Err(err) = self.persist() {
            tracing::warn!(
                path = %self.storage.path().display(),
                %err,
                "failed to persist bookmarks"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{CoverRef, Published};

    fn book(id: &str) -> BookSummary {
        BookSummary {
            id: id.to_owned(),
            title: "The Dispossessed".to_owned(),
            primary_author: "Ursula K. Le Guin".to_owned(),
            first_published: Published::Year(1974),
            cover: Some(CoverRef::Edition(vec!["OL9M".to_owned()])),
            authors: Vec::new(),
            languages: Vec::new(),
        }
    }

    #[test]
    fn toggle_twice_restores_prior_state() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let storage = LocalStorage::new(temp.path().join("storage.json"));
        let mut store = BookmarkStore::load(storage.clone());
        store.toggle(&book("/works/OL2W"));
        let before = store.entries().cloned().collect::<Vec<_>>();
        let persisted_before = storage.get(BOOKMARKS_KEY);

        assert_eq!(store.toggle(&book("/works/OL1W")), Toggled::Added);
        assert_eq!(store.toggle(&book("/works/OL1W")), Toggled::Removed);

        assert_eq!(store.entries().cloned().collect::<Vec<_>>(), before);
        assert_eq!(storage.get(BOOKMARKS_KEY), persisted_before);
        Ok(())
    }

    #[test]
    fn bookmark_survives_reload_with_identical_fields() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("storage.json");

        let mut store = BookmarkStore::load(LocalStorage::new(&path));
        assert!(store.is_empty());
        store.toggle(&book("/works/OL1W"));
        assert_eq!(store.len(), 1);
        let saved = store.get("/works/OL1W").cloned();

        let reloaded = BookmarkStore::load(LocalStorage::new(&path));
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("/works/OL1W").cloned(), saved);
        Ok(())
    }

    #[test]
    fn malformed_bookmarks_load_as_empty() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let storage = LocalStorage::new(temp.path().join("storage.json"));
        storage.set(BOOKMARKS_KEY, serde_json::json!(["not", "a", "map"]))?;

        let store = BookmarkStore::load(storage);
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn snapshot_does_not_follow_later_catalog_changes() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let mut store = BookmarkStore::load(LocalStorage::new(temp.path().join("s.json")));
        let mut original = book("/works/OL1W");
        store.toggle(&original);

        original.title = "Renamed upstream".to_owned();
        let entry = store.get("/works/OL1W").expect("bookmark");
        assert_eq!(entry.title, "The Dispossessed");
        Ok(())
    }

    #[test]
    fn remove_and_clear_persist() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("storage.json");
        let storage = LocalStorage::new(&path);
        storage.set("theme", serde_json::json!("dark"))?;
        let mut store = BookmarkStore::load(storage.clone());
        store.toggle(&book("/works/OL1W"));
        store.toggle(&book("/works/OL2W"));

        assert!(store.remove("/works/OL1W").is_some());
        assert!(store.remove("/works/OL1W").is_none());
        assert_eq!(BookmarkStore::load(LocalStorage::new(&path)).len(), 1);

        store.clear();
        assert!(store.is_empty());
        assert!(BookmarkStore::load(LocalStorage::new(&path)).is_empty());
        assert_eq!(storage.get(BOOKMARKS_KEY), None);
        assert_eq!(storage.get("theme"), Some(serde_json::json!("dark")));
        Ok(())
    }

    #[test]
    fn write_failure_keeps_in_memory_state() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        // A directory where the document should be makes every write fail.
        let path = temp.path().join("storage.json");
        std::fs::create_dir_all(&path)?;
        let mut store = BookmarkStore::load(LocalStorage::new(&path));

        assert_eq!(store.toggle(&book("/works/OL1W")), Toggled::Added);
        assert!(store.contains("/works/OL1W"));
        assert!(store.persist().is_err());
        Ok(())
    }
}
