//! crates/campus_vault_core/src/store.rs
//!
//! JSON helpers over the `KeyValueStore` port, plus an in-memory store used by
//! tests and by the service when no data directory is wanted.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::ports::{KeyValueStore, PortError, PortResult};

/// Reads and decodes the JSON blob stored under `key`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PortResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and writes it under `key`, replacing any previous blob.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> PortResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}

/// A process-local store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| PortError::Unexpected("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> PortResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PortError::Unexpected("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<String>> = read_json(&store, "absent").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn json_blob_round_trips_through_the_store() {
        let store = MemoryStore::new();
        write_json(&store, "ids", &vec!["a", "b"]).await.unwrap();

        let raw = store.get("ids").await.unwrap().unwrap();
        assert_eq!(raw, r#"["a","b"]"#);

        let ids: Vec<String> = read_json(&store, "ids").await.unwrap().unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn corrupt_blob_is_reported() {
        let store = MemoryStore::new();
        store.set("ids", "not json".to_string()).await.unwrap();
        let result: PortResult<Option<Vec<String>>> = read_json(&store, "ids").await;
        assert!(matches!(result, Err(PortError::Unexpected(_))));
    }
}
