//! services/api/src/adapters/catalog.rs
//!
//! Loads the browse catalog from disk, falling back to the compiled-in one.

use campus_vault_core::catalog::Catalog;
use campus_vault_core::ports::{PortError, PortResult};
use std::path::Path;
use tracing::info;

pub async fn load_catalog(path: Option<&Path>) -> PortResult<Catalog> {
    let catalog = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                PortError::Unexpected(format!("reading catalog {}: {}", path.display(), e))
            })?;
            Catalog::from_json(&raw)?
        }
        None => Catalog::builtin()?,
    };
    info!(
        "Catalog loaded: {} resources, {} past papers.",
        catalog.resources.len(),
        catalog.past_papers.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_to_the_builtin_catalog() {
        let catalog = load_catalog(None).await.unwrap();
        assert!(!catalog.resources.is_empty());
        assert!(!catalog.past_papers.is_empty());
    }

    #[tokio::test]
    async fn reads_a_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"resources": []}"#).unwrap();

        let catalog = load_catalog(Some(&path)).await.unwrap();
        assert!(catalog.resources.is_empty());
        assert!(catalog.past_papers.is_empty());
    }

    #[tokio::test]
    async fn rejects_a_malformed_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            load_catalog(Some(&path)).await,
            Err(PortError::Validation(_))
        ));
    }
}
