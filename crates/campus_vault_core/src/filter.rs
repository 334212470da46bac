//! crates/campus_vault_core/src/filter.rs
//!
//! Computes the visible slice of the catalog for a set of browse criteria.
//!
//! Every criterion is a conjunct. Filtering is stable: surviving resources keep
//! their catalog order and the input is never modified.

use std::collections::HashSet;
use std::str::FromStr;

use crate::domain::{Department, Resource, ResourceType, Semester};

/// A single facet selection: everything, or one specific value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facet<T> {
    All,
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::All
    }
}

impl<T: PartialEq> Facet<T> {
    /// Whether `value` passes this facet. An absent value only passes `All`.
    pub fn admits(&self, value: Option<&T>) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(wanted) => value == Some(wanted),
        }
    }
}

impl<T> Facet<T>
where
    T: FromStr<Err = String>,
{
    /// Parses a query-string facet where a missing value, `""` and `"all"` mean `All`.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Ok(Facet::All),
            Some(value) => value.parse().map(Facet::Only),
        }
    }
}

/// The criteria of a browse view.
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    pub department: Facet<Department>,
    pub resource_type: Facet<ResourceType>,
    pub semester: Facet<Semester>,
    pub subject: Facet<String>,
    pub year: Facet<u16>,
    /// Free text, matched case-insensitively as a substring.
    pub search: String,
    /// When set, only these resource ids are visible ("bookmarks only" view).
    pub bookmarks: Option<HashSet<String>>,
}

impl ResourceQuery {
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(bookmarks) = &self.bookmarks {
            if !bookmarks.contains(&resource.id) {
                return false;
            }
        }

        self.department.admits(Some(&resource.department))
            && self.resource_type.admits(Some(&resource.resource_type))
            && self.semester.admits(Some(&resource.semester))
            && self.subject.admits(resource.subject.as_ref())
            && self.year.admits(resource.year.as_ref())
            && matches_search(resource, &self.search)
    }
}

fn matches_search(resource: &Resource, search: &str) -> bool {
    if search.trim().is_empty() {
        return true;
    }
    let needle = search.to_lowercase();

    let haystacks = [
        Some(resource.title.as_str()),
        Some(resource.description.as_str()),
        Some(resource.uploaded_by.as_str()),
        resource.subject.as_deref(),
    ];
    haystacks
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Returns the resources of `catalog` that satisfy `query`, in catalog order.
pub fn filter_resources<'a>(catalog: &'a [Resource], query: &ResourceQuery) -> Vec<&'a Resource> {
    catalog.iter().filter(|r| query.matches(r)).collect()
}

/// Distinct exam years present in `catalog`, newest first.
pub fn available_years(catalog: &[Resource]) -> Vec<u16> {
    let mut years: Vec<u16> = catalog
        .iter()
        .filter_map(|r| r.year)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years
}

/// Distinct subjects in first-appearance order, optionally within one department.
pub fn available_subjects(catalog: &[Resource], department: &Facet<Department>) -> Vec<String> {
    let mut seen = HashSet::new();
    catalog
        .iter()
        .filter(|r| department.admits(Some(&r.department)))
        .filter_map(|r| r.subject.as_deref())
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn resource(id: &str, department: Department, semester: u8) -> Resource {
        Resource {
            id: id.to_string(),
            title: format!("Resource {}", id),
            description: "Lecture material".to_string(),
            resource_type: ResourceType::Notes,
            department,
            semester: Semester::new(semester).unwrap(),
            file_url: format!("https://files.example/{}.pdf", id),
            file_name: format!("{}.pdf", id),
            file_size: "1.0 MB".to_string(),
            uploaded_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            uploaded_by: "Prof. Kumar".to_string(),
            downloads: 0,
            subject: None,
            year: None,
        }
    }

    fn paper(id: &str, subject: Option<&str>, year: Option<u16>) -> Resource {
        Resource {
            resource_type: ResourceType::Pyq,
            subject: subject.map(str::to_string),
            year,
            ..resource(id, Department::ComputerScience, 3)
        }
    }

    fn four_resources() -> Vec<Resource> {
        vec![
            resource("a", Department::ComputerScience, 3),
            resource("b", Department::Electronics, 3),
            resource("c", Department::ComputerScience, 5),
            resource("d", Department::Electronics, 4),
        ]
    }

    fn ids(resources: &[&Resource]) -> Vec<String> {
        resources.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn default_query_returns_whole_catalog_in_order() {
        let catalog = four_resources();
        let result = filter_resources(&catalog, &ResourceQuery::default());
        assert_eq!(result.len(), catalog.len());
        assert!(result.iter().zip(catalog.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn department_filter_keeps_matching_entries_in_order() {
        let catalog = four_resources();
        let query = ResourceQuery {
            department: Facet::Only(Department::ComputerScience),
            ..Default::default()
        };
        assert_eq!(ids(&filter_resources(&catalog, &query)), vec!["a", "c"]);
    }

    #[test]
    fn criteria_compose_conjunctively() {
        let catalog = four_resources();
        let query = ResourceQuery {
            department: Facet::Only(Department::Electronics),
            semester: Facet::Only(Semester::new(4).unwrap()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_resources(&catalog, &query)), vec!["d"]);
    }

    #[test]
    fn search_is_case_insensitive_substring_over_text_fields() {
        let mut catalog = four_resources();
        catalog[1].title = "Digital LOGIC design".to_string();
        catalog[2].uploaded_by = "Dr. Logan".to_string();

        let query = ResourceQuery {
            search: "LoG".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_resources(&catalog, &query)), vec!["b", "c"]);
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_search_text() {
        let mut catalog = four_resources();
        catalog[1].title = "Digital LOGIC design".to_string();
        catalog[2].title = "Intro to log tables".to_string();

        let query = ResourceQuery {
            search: " log ".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_resources(&catalog, &query)), vec!["c"]);

        let blank = ResourceQuery {
            search: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_resources(&catalog, &blank).len(), catalog.len());
    }

    #[test]
    fn no_match_yields_empty_result() {
        let catalog = four_resources();
        let query = ResourceQuery {
            search: "quantum chromodynamics".to_string(),
            ..Default::default()
        };
        assert!(filter_resources(&catalog, &query).is_empty());
    }

    #[test]
    fn bookmarks_restrict_to_members() {
        let catalog = four_resources();
        let query = ResourceQuery {
            bookmarks: Some(["d".to_string(), "a".to_string()].into_iter().collect()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_resources(&catalog, &query)), vec!["a", "d"]);
    }

    #[test]
    fn absent_subject_or_year_never_matches_a_specific_value() {
        let catalog = vec![
            paper("p1", Some("Data Structures"), Some(2023)),
            paper("p2", None, None),
            paper("p3", Some("Data Structures"), Some(2022)),
        ];

        let by_subject = ResourceQuery {
            subject: Facet::Only("Data Structures".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_resources(&catalog, &by_subject)), vec!["p1", "p3"]);

        let by_year = ResourceQuery {
            year: Facet::Only(2023),
            ..Default::default()
        };
        assert_eq!(ids(&filter_resources(&catalog, &by_year)), vec!["p1"]);

        let by_subject_text = ResourceQuery {
            search: "structures".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ids(&filter_resources(&catalog, &by_subject_text)),
            vec!["p1", "p3"]
        );
    }

    #[test]
    fn output_is_always_an_ordered_subset() {
        let catalog = four_resources();
        let departments = [
            Facet::All,
            Facet::Only(Department::ComputerScience),
            Facet::Only(Department::Civil),
        ];
        let semesters = [Facet::All, Facet::Only(Semester::new(3).unwrap())];
        let searches = ["", "resource", "zzz"];

        for department in &departments {
            for semester in &semesters {
                for search in searches {
                    let query = ResourceQuery {
                        department: department.clone(),
                        semester: semester.clone(),
                        search: search.to_string(),
                        ..Default::default()
                    };
                    let result = filter_resources(&catalog, &query);
                    let positions: Vec<usize> = result
                        .iter()
                        .map(|r| catalog.iter().position(|c| c.id == r.id).unwrap())
                        .collect();
                    assert!(positions.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }

    #[test]
    fn facets_list_years_descending_and_subjects_per_department() {
        let mut catalog = vec![
            paper("p1", Some("Data Structures"), Some(2022)),
            paper("p2", Some("Networks"), Some(2023)),
            paper("p3", Some("Data Structures"), Some(2023)),
        ];
        catalog.push(Resource {
            department: Department::Mechanical,
            ..paper("p4", Some("Fluid Mechanics"), Some(2021))
        });

        assert_eq!(available_years(&catalog), vec![2023, 2022, 2021]);
        assert_eq!(
            available_subjects(&catalog, &Facet::All),
            vec!["Data Structures", "Networks", "Fluid Mechanics"]
        );
        assert_eq!(
            available_subjects(&catalog, &Facet::Only(Department::Mechanical)),
            vec!["Fluid Mechanics"]
        );
    }

    #[test]
    fn facet_parsing_treats_all_and_blank_as_unrestricted() {
        assert_eq!(Facet::<Department>::parse(None), Ok(Facet::All));
        assert_eq!(Facet::<Department>::parse(Some("all")), Ok(Facet::All));
        assert_eq!(
            Facet::<Semester>::parse(Some("5")),
            Ok(Facet::Only(Semester::new(5).unwrap()))
        );
        assert!(Facet::<Semester>::parse(Some("9")).is_err());
    }
}
