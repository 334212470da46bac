//! crates/campus_vault_core/src/bookmarks.rs
//!
//! A persistent, per-profile set of bookmarked resource ids.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::ports::{KeyValueStore, PortResult};
use crate::store::{read_json, write_json};

/// Storage key of the default profile's bookmarks.
pub const BOOKMARKS_KEY: &str = "college-hub-bookmarks";

pub struct BookmarkSet {
    store: Arc<dyn KeyValueStore>,
    key: String,
    lock: Mutex<()>,
}

impl BookmarkSet {
    /// The bookmark set of the default profile.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, BOOKMARKS_KEY.to_string())
    }

    /// The bookmark set of a named profile, stored under its own key.
    pub fn for_profile(store: Arc<dyn KeyValueStore>, profile: &str) -> Self {
        Self::with_key(store, format!("{}:{}", BOOKMARKS_KEY, profile))
    }

    fn with_key(store: Arc<dyn KeyValueStore>, key: String) -> Self {
        Self {
            store,
            key,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> PortResult<Vec<String>> {
        Ok(read_json(self.store.as_ref(), &self.key)
            .await?
            .unwrap_or_default())
    }

    /// Bookmarked ids in the order they were added.
    pub async fn list(&self) -> PortResult<Vec<String>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    pub async fn has(&self, resource_id: &str) -> PortResult<bool> {
        Ok(self.list().await?.iter().any(|id| id == resource_id))
    }

    /// Flips membership of `resource_id`; returns whether it is now bookmarked.
    pub async fn toggle(&self, resource_id: &str) -> PortResult<bool> {
        let _guard = self.lock.lock().await;
        let mut ids = self.load().await?;

        let now_bookmarked = match ids.iter().position(|id| id == resource_id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(resource_id.to_string());
                true
            }
        };

        write_json(self.store.as_ref(), &self.key, &ids).await?;
        debug!(
            "Bookmark {} {} under {}.",
            resource_id,
            if now_bookmarked { "added" } else { "removed" },
            self.key
        );
        Ok(now_bookmarked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn starts_empty() {
        let bookmarks = BookmarkSet::new(Arc::new(MemoryStore::new()));
        assert!(bookmarks.list().await.unwrap().is_empty());
        assert!(!bookmarks.has("1").await.unwrap());
    }

    #[tokio::test]
    async fn toggle_twice_restores_membership() {
        let bookmarks = BookmarkSet::new(Arc::new(MemoryStore::new()));
        bookmarks.toggle("3").await.unwrap();
        let original = bookmarks.list().await.unwrap();

        assert!(bookmarks.toggle("5").await.unwrap());
        assert!(bookmarks.has("5").await.unwrap());
        assert!(!bookmarks.toggle("5").await.unwrap());

        assert_eq!(bookmarks.list().await.unwrap(), original);
    }

    #[tokio::test]
    async fn membership_survives_a_new_instance() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        BookmarkSet::new(store.clone()).toggle("7").await.unwrap();
        BookmarkSet::new(store.clone()).toggle("2").await.unwrap();

        let reopened = BookmarkSet::new(store.clone());
        assert_eq!(reopened.list().await.unwrap(), vec!["7", "2"]);
        assert_eq!(
            store.get(BOOKMARKS_KEY).await.unwrap().as_deref(),
            Some(r#"["7","2"]"#)
        );
    }

    #[tokio::test]
    async fn profiles_are_isolated() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let alice = BookmarkSet::for_profile(store.clone(), "alice");
        let default = BookmarkSet::new(store);

        alice.toggle("1").await.unwrap();
        assert!(alice.has("1").await.unwrap());
        assert!(!default.has("1").await.unwrap());
    }
}
