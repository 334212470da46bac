//! crates/campus_vault_core/src/domain.rs
//!
//! Defines the core data structures for the portal: catalog entries, student
//! submissions, chat messages and accounts.
//!
//! These types carry their JSON shape (camelCase fields, kebab/lowercase enum
//! values) because the key-value store and the HTTP layer both persist and
//! exchange them as JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

//=========================================================================================
// Catalog Enumerations
//=========================================================================================

/// The kind of academic material a resource represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Notes,
    Timetable,
    Syllabus,
    Assignment,
    /// Previous Year Questions (past exam papers).
    Pyq,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Notes,
        ResourceType::Timetable,
        ResourceType::Syllabus,
        ResourceType::Assignment,
        ResourceType::Pyq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Notes => "notes",
            ResourceType::Timetable => "timetable",
            ResourceType::Syllabus => "syllabus",
            ResourceType::Assignment => "assignment",
            ResourceType::Pyq => "pyq",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Notes => "Notes",
            ResourceType::Timetable => "Timetable",
            ResourceType::Syllabus => "Syllabus",
            ResourceType::Assignment => "Assignment",
            ResourceType::Pyq => "Previous Year Questions",
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown resource type '{}'", s))
    }
}

/// The academic departments covered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Department {
    ComputerScience,
    Electronics,
    Mechanical,
    Civil,
    Electrical,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::ComputerScience,
        Department::Electronics,
        Department::Mechanical,
        Department::Civil,
        Department::Electrical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::ComputerScience => "computer-science",
            Department::Electronics => "electronics",
            Department::Mechanical => "mechanical",
            Department::Civil => "civil",
            Department::Electrical => "electrical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Department::ComputerScience => "Computer Science",
            Department::Electronics => "Electronics & Communication",
            Department::Mechanical => "Mechanical Engineering",
            Department::Civil => "Civil Engineering",
            Department::Electrical => "Electrical Engineering",
        }
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown department '{}'", s))
    }
}

/// A semester number, always within 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Semester(u8);

impl Semester {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(value: u8) -> Result<Self, String> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "semester must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Semester::new(value)
    }
}

impl From<Semester> for u8 {
    fn from(semester: Semester) -> Self {
        semester.0
    }
}

impl FromStr for Semester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<u8>()
            .map_err(|_| format!("'{}' is not a semester number", s))?;
        Semester::new(value)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//=========================================================================================
// Catalog Entries
//=========================================================================================

/// A published academic file shown in the catalog. Never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub department: Department,
    #[schema(value_type = u8)]
    pub semester: Semester,
    pub file_url: String,
    pub file_name: String,
    /// Display string, e.g. "2.4 MB".
    pub file_size: String,
    pub uploaded_at: NaiveDate,
    pub uploaded_by: String,
    pub downloads: u32,
    /// Only set on past exam papers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Only set on past exam papers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

//=========================================================================================
// Student Submissions
//=========================================================================================

/// Review state of a student submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending Review",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown approval status '{}'", other)),
        }
    }
}

/// A student-contributed candidate resource awaiting (or past) faculty review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubmission {
    pub id: String,
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
    pub submitted_at: NaiveDate,
    pub submitted_by: String,
    pub student_email: String,
    pub status: ApprovalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// The fields a student supplies when submitting material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
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
    pub submitted_by: String,
    pub student_email: String,
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Faculty roles may review submissions.
    pub fn is_faculty(&self) -> bool {
        matches!(self, Role::Admin | Role::Teacher)
    }
}

// Credentials live with the identity provider, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub email: String,
    pub name: String,
    pub role: Role,
}
