//! services/api/src/adapters/store.rs
//!
//! A `KeyValueStore` backed by a directory of JSON files, one per key.
//!
//! ```text
//! {data_dir}/
//! ├── student_submissions.json
//! ├── campus_accounts.json
//! ├── college-hub-bookmarks.json
//! └── college-hub-bookmarks%3Aalice.json   # per-profile bookmarks
//! ```

use async_trait::async_trait;
use campus_vault_core::ports::{KeyValueStore, PortError, PortResult};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Creates the data directory if needed.
    pub async fn open(root_dir: impl Into<PathBuf>) -> PortResult<Self> {
        let root_dir = root_dir.into();
        tokio::fs::create_dir_all(&root_dir).await.map_err(io_error)?;
        debug!("File store opened at {}.", root_dir.display());
        Ok(Self { root_dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Escapes every byte outside `[A-Za-z0-9._-]` as `%XX`, so distinct keys
/// never share a file and no key can leave the data directory.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => stem.push(byte as char),
            b'.' if !stem.is_empty() => stem.push('.'),
            other => stem.push_str(&format!("%{:02X}", other)),
        }
    }
    stem
}

fn io_error(e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("file store: {}", e))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }

    /// Writes to a temporary sibling and renames it over the target, so a
    /// reader never observes a half-written blob.
    async fn set(&self, key: &str, value: String) -> PortResult<()> {
        let path = self.path(key);
        let tmp = self
            .root_dir
            .join(format!(".{}.{}.tmp", file_stem(key), Uuid::new_v4()));

        let mut file = tokio::fs::File::create(&tmp).await.map_err(io_error)?;
        file.write_all(value.as_bytes()).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(e));
        }
        Ok(())
    }
}
