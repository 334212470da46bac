//! crates/campus_vault_core/src/workflow.rs
//!
//! The approval workflow: the review state machine and the checks that guard
//! every submission and faculty decision before it reaches the repository.
//!
//! ```text
//!            approve(reviewer)
//!   pending ------------------> approved
//!      |
//!      |  reject(reviewer, reason)
//!      +----------------------> rejected
//! ```
//!
//! `approved` and `rejected` are terminal.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{ApprovalStatus, NewSubmission, StudentSubmission};
use crate::ports::PortError;
use crate::submissions::{SubmissionRepository, UpdateOutcome};

/// A terminal review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl From<Verdict> for ApprovalStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Approved => ApprovalStatus::Approved,
            Verdict::Rejected => ApprovalStatus::Rejected,
        }
    }
}

/// A faculty action against a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject { reason: String },
}

impl ReviewAction {
    pub fn verdict(&self) -> Verdict {
        match self {
            ReviewAction::Approve => Verdict::Approved,
            ReviewAction::Reject { .. } => Verdict::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("submission has already been {0}")]
    Terminal(ApprovalStatus),
    #[error("a rejection requires a non-empty reason")]
    MissingReason,
}

impl ApprovalStatus {
    /// The state reached by applying `action` to this state.
    pub fn apply(self, action: &ReviewAction) -> Result<ApprovalStatus, TransitionError> {
        match (self, action) {
            (ApprovalStatus::Pending, ReviewAction::Reject { reason }) if reason.trim().is_empty() => {
                Err(TransitionError::MissingReason)
            }
            (ApprovalStatus::Pending, action) => Ok(action.verdict().into()),
            (terminal, _) => Err(TransitionError::Terminal(terminal)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Submission not found: {0}")]
    NotFound(String),
    #[error("Submission {id} has already been {status}")]
    AlreadyReviewed { id: String, status: ApprovalStatus },
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Checks the fields a student must supply before a submission is stored.
pub fn validate_submission(new: &NewSubmission) -> Result<(), WorkflowError> {
    let required = [
        ("title", &new.title),
        ("description", &new.description),
        ("submittedBy", &new.submitted_by),
        ("fileUrl", &new.file_url),
        ("fileName", &new.file_name),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(WorkflowError::Validation(format!("{} must not be empty", field)));
        }
    }

    if !is_plausible_email(&new.student_email) {
        return Err(WorkflowError::Validation(format!(
            "'{}' is not a valid email address",
            new.student_email
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Drives submissions through review on top of the repository.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    repository: Arc<SubmissionRepository>,
}

impl ApprovalWorkflow {
    pub fn new(repository: Arc<SubmissionRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &SubmissionRepository {
        &self.repository
    }

    /// Validates and stores a new pending submission.
    pub async fn submit(&self, new: NewSubmission) -> Result<StudentSubmission, WorkflowError> {
        validate_submission(&new)?;
        Ok(self.repository.add(new).await?)
    }

    pub async fn approve(&self, id: &str, reviewer: &str) -> Result<StudentSubmission, WorkflowError> {
        self.review(id, reviewer, ReviewAction::Approve).await
    }

    pub async fn reject(
        &self,
        id: &str,
        reviewer: &str,
        reason: &str,
    ) -> Result<StudentSubmission, WorkflowError> {
        let action = ReviewAction::Reject {
            reason: reason.trim().to_string(),
        };
        self.review(id, reviewer, action).await
    }

    async fn review(
        &self,
        id: &str,
        reviewer: &str,
        action: ReviewAction,
    ) -> Result<StudentSubmission, WorkflowError> {
        let reviewer = reviewer.trim();
        if reviewer.is_empty() {
            return Err(WorkflowError::Validation("reviewer must not be empty".to_string()));
        }
        if let Err(TransitionError::MissingReason) = ApprovalStatus::Pending.apply(&action) {
            return Err(WorkflowError::Validation(TransitionError::MissingReason.to_string()));
        }

        let reason = match &action {
            ReviewAction::Reject { reason } => Some(reason.clone()),
            ReviewAction::Approve => None,
        };
        let outcome = self
            .repository
            .update_status_if(id, action.verdict(), reviewer, reason, |current| {
                current.status.apply(&action).is_ok()
            })
            .await?;

        match outcome {
            UpdateOutcome::Updated(submission) => {
                info!("{} reviewed submission {} as {}.", reviewer, id, submission.status);
                Ok(submission)
            }
            UpdateOutcome::NotFound => Err(WorkflowError::NotFound(id.to_string())),
            UpdateOutcome::PreconditionFailed(current) => {
                warn!(
                    "Refused to review submission {}: already {}.",
                    id, current.status
                );
                Err(WorkflowError::AlreadyReviewed {
                    id: id.to_string(),
                    status: current.status,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Department, ResourceType, Semester};
    use crate::store::MemoryStore;

    fn workflow() -> ApprovalWorkflow {
        let store = Arc::new(MemoryStore::new());
        ApprovalWorkflow::new(Arc::new(SubmissionRepository::new(store)))
    }

    fn new_submission() -> NewSubmission {
        NewSubmission {
            title: "Fluid Mechanics Notes".to_string(),
            description: "Handwritten notes for units 1-3".to_string(),
            resource_type: ResourceType::Notes,
            department: Department::Mechanical,
            semester: Semester::new(4).unwrap(),
            file_url: "https://files.example/fm.pdf".to_string(),
            file_name: "fm.pdf".to_string(),
            file_size: "2.0 MB".to_string(),
            submitted_by: "Arjun Das".to_string(),
            student_email: "arjun@college.edu".to_string(),
        }
    }

    #[test]
    fn state_machine_only_leaves_pending() {
        let reject = ReviewAction::Reject {
            reason: "Duplicate of an existing upload".to_string(),
        };
        assert_eq!(
            ApprovalStatus::Pending.apply(&ReviewAction::Approve),
            Ok(ApprovalStatus::Approved)
        );
        assert_eq!(ApprovalStatus::Pending.apply(&reject), Ok(ApprovalStatus::Rejected));
        assert_eq!(
            ApprovalStatus::Approved.apply(&reject),
            Err(TransitionError::Terminal(ApprovalStatus::Approved))
        );
        assert_eq!(
            ApprovalStatus::Rejected.apply(&ReviewAction::Approve),
            Err(TransitionError::Terminal(ApprovalStatus::Rejected))
        );
        assert_eq!(
            ApprovalStatus::Pending.apply(&ReviewAction::Reject { reason: "  ".into() }),
            Err(TransitionError::MissingReason)
        );
    }

    #[test]
    fn submission_validation_catches_blank_fields_and_bad_email() {
        assert!(validate_submission(&new_submission()).is_ok());

        let mut untitled = new_submission();
        untitled.title = "   ".to_string();
        assert!(matches!(
            validate_submission(&untitled),
            Err(WorkflowError::Validation(msg)) if msg.contains("title")
        ));

        for email in ["", "arjun", "arjun@", "@college.edu", "arjun@college", "a b@c.edu"] {
            let mut bad = new_submission();
            bad.student_email = email.to_string();
            assert!(validate_submission(&bad).is_err(), "accepted {:?}", email);
        }
    }

    #[tokio::test]
    async fn empty_title_never_reaches_the_repository() {
        let workflow = workflow();
        let before = workflow.repository().list().await.unwrap().len();

        let mut untitled = new_submission();
        untitled.title = String::new();
        assert!(workflow.submit(untitled).await.is_err());
        assert_eq!(workflow.repository().list().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn submit_then_approve() {
        let workflow = workflow();
        let created = workflow.submit(new_submission()).await.unwrap();
        assert_eq!(created.status, ApprovalStatus::Pending);

        let approved = workflow.approve(&created.id, "Prof. Kumar").await.unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert_eq!(approved.reviewed_by.as_deref(), Some("Prof. Kumar"));
        assert!(approved.rejection_reason.is_none());
    }

    #[tokio::test]
    async fn reject_requires_a_reason_and_trims_it() {
        let workflow = workflow();
        assert!(matches!(
            workflow.reject("sub-1", "Prof. Reddy", "   ").await,
            Err(WorkflowError::Validation(_))
        ));
        let still_pending = workflow.repository().get("sub-1").await.unwrap().unwrap();
        assert_eq!(still_pending.status, ApprovalStatus::Pending);

        let rejected = workflow
            .reject("sub-1", "Prof. Reddy", "  Missing unit 4.  ")
            .await
            .unwrap();
        assert_eq!(rejected.status, ApprovalStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Missing unit 4."));
    }

    #[tokio::test]
    async fn terminal_submissions_cannot_be_reviewed_again() {
        let workflow = workflow();
        let result = workflow.reject("sub-2", "Prof. Reddy", "Changed my mind").await;
        assert!(matches!(
            result,
            Err(WorkflowError::AlreadyReviewed { status: ApprovalStatus::Approved, .. })
        ));
    }

    #[tokio::test]
    async fn unknown_submission_is_not_found() {
        let workflow = workflow();
        assert!(matches!(
            workflow.approve("sub-404", "Prof. Kumar").await,
            Err(WorkflowError::NotFound(id)) if id == "sub-404"
        ));
    }

    #[tokio::test]
    async fn blank_reviewer_is_rejected() {
        let workflow = workflow();
        assert!(matches!(
            workflow.approve("sub-1", " ").await,
            Err(WorkflowError::Validation(_))
        ));
    }
}
