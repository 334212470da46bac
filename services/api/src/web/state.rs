//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use campus_vault_core::accounts::AccountDirectory;
use campus_vault_core::bookmarks::BookmarkSet;
use campus_vault_core::catalog::Catalog;
use campus_vault_core::chat::ChatRelay;
use campus_vault_core::ports::{ChatCompletionService, KeyValueStore};
use campus_vault_core::preview::PreviewWindow;
use campus_vault_core::submissions::SubmissionRepository;
use campus_vault_core::workflow::ApprovalWorkflow;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub workflow: ApprovalWorkflow,
    pub accounts: AccountDirectory,
    /// `None` when no upstream credential is configured.
    pub chat: Option<ChatRelay>,
    store: Arc<dyn KeyValueStore>,
    /// Sets still held by an in-flight request. Released sets drop out.
    bookmarks: Mutex<HashMap<String, Weak<BookmarkSet>>>,
    pub previews: Mutex<HashMap<String, PreviewWindow>>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        catalog: Catalog,
        store: Arc<dyn KeyValueStore>,
        upstream: Option<Arc<dyn ChatCompletionService>>,
    ) -> Self {
        let repository = Arc::new(SubmissionRepository::new(store.clone()));
        Self {
            config,
            catalog,
            workflow: ApprovalWorkflow::new(repository),
            accounts: AccountDirectory::new(store.clone()),
            chat: upstream.map(ChatRelay::new),
            store,
            bookmarks: Mutex::new(HashMap::new()),
            previews: Mutex::new(HashMap::new()),
        }
    }

    pub fn submissions(&self) -> &SubmissionRepository {
        self.workflow.repository()
    }

    /// One shared set per profile while any request holds it, so toggles on
    /// the same profile serialize. `None` selects the default profile.
    pub async fn bookmarks(&self, profile: Option<&str>) -> Arc<BookmarkSet> {
        let profile = profile.map(str::trim).filter(|p| !p.is_empty());
        let mut sets = self.bookmarks.lock().await;
        sets.retain(|_, set| set.strong_count() > 0);

        let key = profile.unwrap_or_default().to_string();
        if let Some(set) = sets.get(&key).and_then(Weak::upgrade) {
            return set;
        }
        let set = Arc::new(match profile {
            Some(profile) => BookmarkSet::for_profile(self.store.clone(), profile),
            None => BookmarkSet::new(self.store.clone()),
        });
        sets.insert(key, Arc::downgrade(&set));
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_vault_core::store::MemoryStore;
    use std::time::Duration;

    fn state() -> AppState {
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            data_dir: std::env::temp_dir(),
            log_level: tracing::Level::INFO,
            catalog_path: None,
            chat_api_url: "http://127.0.0.1:9/unused".to_string(),
            chat_api_key: None,
            chat_model: "test-model".to_string(),
            chat_timeout: Duration::from_secs(5),
            preview_duration: Duration::from_secs(10),
            cors_origin: "http://localhost:5173".to_string(),
        };
        AppState::new(
            Arc::new(config),
            Catalog::builtin().unwrap(),
            Arc::new(MemoryStore::new()),
            None,
        )
    }

    #[tokio::test]
    async fn released_profiles_are_not_kept_alive() {
        let state = state();
        for n in 0..100 {
            let set = state.bookmarks(Some(&format!("profile-{}", n))).await;
            set.toggle("1").await.unwrap();
        }
        let _default = state.bookmarks(None).await;
        assert_eq!(state.bookmarks.lock().await.len(), 1);

        let again = state.bookmarks(Some("profile-7")).await;
        assert_eq!(again.list().await.unwrap(), vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_holders_of_a_profile_share_one_set() {
        let state = state();
        let first = state.bookmarks(Some(" shared ")).await;
        let second = state.bookmarks(Some("shared")).await;
        assert!(Arc::ptr_eq(&first, &second));

        let default = state.bookmarks(Some("  ")).await;
        assert!(!Arc::ptr_eq(&first, &default));
        assert!(Arc::ptr_eq(&default, &state.bookmarks(None).await));
    }
}
