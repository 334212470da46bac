//! services/api/src/web/protocol.rs
//!
//! Request and response payloads of the HTTP API, and the translation from
//! query strings into core filter criteria.

use campus_vault_core::accounts::SeedResult;
use campus_vault_core::filter::{Facet, ResourceQuery};
use campus_vault_core::{
    ApprovalStatus, ChatMessage, Department, NewSubmission, ResourceType, Semester,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;

//=========================================================================================
// Query Strings
//=========================================================================================

/// Browse filters for `/resources`. Missing values and `all` select everything.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResourceQueryParams {
    /// e.g. `computer-science`
    pub department: Option<String>,
    /// e.g. `notes`
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// 1 through 8
    pub semester: Option<String>,
    /// Free-text search over title, description, uploader and subject.
    pub q: Option<String>,
    /// Only show the caller's bookmarks.
    pub bookmarked: Option<bool>,
}

/// Browse filters for `/pyqs`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PyqQueryParams {
    pub department: Option<String>,
    pub semester: Option<String>,
    pub subject: Option<String>,
    pub year: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FacetQueryParams {
    /// Restricts the subject list to one department.
    pub department: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubmissionListParams {
    /// `pending`, `approved` or `rejected`
    pub status: Option<String>,
    /// Case-insensitive fragment of the student email.
    pub email: Option<String>,
}

fn bad_request(e: String) -> ApiError {
    ApiError::BadRequest(e)
}

fn string_facet(raw: Option<&str>) -> Facet<String> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Facet::All,
        Some(value) => Facet::Only(value.to_string()),
    }
}

fn year_facet(raw: Option<&str>) -> Result<Facet<u16>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(Facet::All),
        Some(value) => value
            .parse()
            .map(Facet::Only)
            .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid year", value))),
    }
}

impl ResourceQueryParams {
    /// Builds the criteria; the bookmark set is attached by the caller.
    pub fn to_query(&self) -> Result<ResourceQuery, ApiError> {
        Ok(ResourceQuery {
            department: Facet::<Department>::parse(self.department.as_deref()).map_err(bad_request)?,
            resource_type: Facet::<ResourceType>::parse(self.resource_type.as_deref())
                .map_err(bad_request)?,
            semester: Facet::<Semester>::parse(self.semester.as_deref()).map_err(bad_request)?,
            search: self.q.clone().unwrap_or_default(),
            ..ResourceQuery::default()
        })
    }
}

impl PyqQueryParams {
    pub fn to_query(&self) -> Result<ResourceQuery, ApiError> {
        Ok(ResourceQuery {
            department: Facet::<Department>::parse(self.department.as_deref()).map_err(bad_request)?,
            semester: Facet::<Semester>::parse(self.semester.as_deref()).map_err(bad_request)?,
            subject: string_facet(self.subject.as_deref()),
            year: year_facet(self.year.as_deref())?,
            search: self.q.clone().unwrap_or_default(),
            ..ResourceQuery::default()
        })
    }
}

impl FacetQueryParams {
    pub fn department(&self) -> Result<Facet<Department>, ApiError> {
        Facet::parse(self.department.as_deref()).map_err(bad_request)
    }
}

//=========================================================================================
// Request Bodies
//=========================================================================================

/// What a student uploads. Name and email are taken from the signed-in account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub department: Department,
    #[schema(value_type = u8)]
    pub semester: Semester,
    pub file_url: String,
    pub file_name: String,
    pub file_size: String,
}

impl SubmissionRequest {
    pub fn into_new_submission(self, submitted_by: &str, student_email: &str) -> NewSubmission {
        NewSubmission {
            title: self.title,
            description: self.description,
            resource_type: self.resource_type,
            department: self.department,
            semester: self.semester,
            file_url: self.file_url,
            file_name: self.file_name,
            file_size: self.file_size,
            submitted_by: submitted_by.to_string(),
            student_email: student_email.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: String,
}

/// The full transcript; the relay keeps no history of its own.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

//=========================================================================================
// Response Bodies
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FacetsResponse {
    /// Newest first.
    pub years: Vec<u16>,
    /// In catalog order.
    pub subjects: Vec<String>,
}

/// A stored enum value and the text shown for it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LabelEntry {
    pub value: String,
    pub label: String,
}

impl LabelEntry {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelsResponse {
    pub departments: Vec<LabelEntry>,
    pub resource_types: Vec<LabelEntry>,
    pub statuses: Vec<LabelEntry>,
}

impl LabelsResponse {
    pub fn all() -> Self {
        Self {
            departments: Department::ALL
                .iter()
                .map(|d| LabelEntry::new(d.as_str(), d.label()))
                .collect(),
            resource_types: ResourceType::ALL
                .iter()
                .map(|t| LabelEntry::new(t.as_str(), t.label()))
                .collect(),
            statuses: ApprovalStatus::ALL
                .iter()
                .map(|s| LabelEntry::new(s.as_str(), s.label()))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookmarksResponse {
    pub bookmarks: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkToggleResponse {
    pub resource_id: String,
    pub bookmarked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResponse {
    pub results: Vec<SeedResult>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub preview_id: String,
    pub resource_id: String,
    pub seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PreviewState {
    Open,
    Expired,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewStatusResponse {
    pub preview_id: String,
    pub resource_id: String,
    pub state: PreviewState,
}
