//! crates/campus_vault_core/src/catalog.rs
//!
//! The static resource catalog and the fixtures the portal boots with.

use serde::{Deserialize, Serialize};

use crate::domain::{Resource, StudentSubmission};
use crate::ports::{PortError, PortResult};

const BUILTIN_CATALOG: &str = include_str!("../fixtures/catalog.json");
const SEED_SUBMISSIONS: &str = include_str!("../fixtures/submissions.json");

/// The read-only collections browsed by students.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Notes, timetables, syllabi and assignments.
    pub resources: Vec<Resource>,
    /// Previous-year exam papers, carrying subject/year facets.
    #[serde(default)]
    pub past_papers: Vec<Resource>,
}

impl Catalog {
    /// Parses a catalog document, rejecting duplicate ids within a collection.
    pub fn from_json(raw: &str) -> PortResult<Self> {
        let catalog: Catalog = serde_json::from_str(raw)
            .map_err(|e| PortError::Validation(format!("invalid catalog: {}", e)))?;
        ensure_unique_ids(&catalog.resources)?;
        ensure_unique_ids(&catalog.past_papers)?;
        Ok(catalog)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> PortResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.resources
            .iter()
            .chain(self.past_papers.iter())
            .any(|r| r.id == resource_id)
    }
}

fn ensure_unique_ids(resources: &[Resource]) -> PortResult<()> {
    let mut seen = std::collections::HashSet::new();
    for resource in resources {
        if !seen.insert(resource.id.as_str()) {
            return Err(PortError::Validation(format!(
                "duplicate resource id '{}' in catalog",
                resource.id
            )));
        }
    }
    Ok(())
}

/// The four submissions a fresh store is seeded with: two pending, one
/// approved and one rejected.
pub fn seed_submissions() -> PortResult<Vec<StudentSubmission>> {
    Ok(serde_json::from_str(SEED_SUBMISSIONS)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApprovalStatus, ResourceType};

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.resources.is_empty());
        assert!(catalog
            .past_papers
            .iter()
            .all(|p| p.resource_type == ResourceType::Pyq));
        assert!(catalog.contains("pyq-1"));
        assert!(!catalog.contains("missing"));
    }

    #[test]
    fn seed_fixture_covers_every_status() {
        let seed = seed_submissions().unwrap();
        assert_eq!(seed.len(), 4);
        assert_eq!(seed[0].id, "sub-1");
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert!(seed.iter().any(|s| s.status == status));
        }
        let rejected = seed
            .iter()
            .find(|s| s.status == ApprovalStatus::Rejected)
            .unwrap();
        assert!(rejected.rejection_reason.is_some());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = r#"{"resources": [
            {"id":"1","title":"a","description":"","type":"notes","department":"civil","semester":1,
             "fileUrl":"u","fileName":"f","fileSize":"1 MB","uploadedAt":"2024-01-01","uploadedBy":"x","downloads":0},
            {"id":"1","title":"b","description":"","type":"notes","department":"civil","semester":1,
             "fileUrl":"u","fileName":"f","fileSize":"1 MB","uploadedAt":"2024-01-01","uploadedBy":"x","downloads":0}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(raw),
            Err(PortError::Validation(_))
        ));
    }
}
