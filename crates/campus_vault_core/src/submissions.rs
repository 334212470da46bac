//! crates/campus_vault_core/src/submissions.rs
//!
//! The submission repository: the single owner of student submission records.
//!
//! The whole collection lives under one key and every mutation rewrites it in
//! full. That is O(n) per write, which is fine at portal scale but is the first
//! thing to change if the collection ever grows large.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::seed_submissions;
use crate::domain::{ApprovalStatus, NewSubmission, StudentSubmission};
use crate::ports::{KeyValueStore, PortResult};
use crate::store::{read_json, write_json};
use crate::workflow::Verdict;

/// Storage key of the submission collection.
pub const SUBMISSIONS_KEY: &str = "student_submissions";

/// The result of a status update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(StudentSubmission),
    NotFound,
    /// The record exists but the caller's precondition refused it; nothing was written.
    PreconditionFailed(StudentSubmission),
}

/// Per-status totals, as shown on the review dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

pub struct SubmissionRepository {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles against the store.
    lock: Mutex<()>,
}

impl SubmissionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Loads the collection, seeding the fixture on first access. Caller holds the lock.
    async fn load(&self) -> PortResult<Vec<StudentSubmission>> {
        if let Some(submissions) = read_json(self.store.as_ref(), SUBMISSIONS_KEY).await? {
            return Ok(submissions);
        }

        let seed = seed_submissions()?;
        info!("No stored submissions found; seeding {} fixture records.", seed.len());
        self.persist(&seed).await?;
        Ok(seed)
    }

    async fn persist(&self, submissions: &[StudentSubmission]) -> PortResult<()> {
        debug!("Writing {} submissions.", submissions.len());
        write_json(self.store.as_ref(), SUBMISSIONS_KEY, submissions).await
    }

    /// All submissions in insertion order.
    pub async fn list(&self) -> PortResult<Vec<StudentSubmission>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    pub async fn get(&self, id: &str) -> PortResult<Option<StudentSubmission>> {
        Ok(self.list().await?.into_iter().find(|s| s.id == id))
    }

    /// Stores a new pending submission under a fresh id and returns it.
    pub async fn add(&self, new: NewSubmission) -> PortResult<StudentSubmission> {
        let _guard = self.lock.lock().await;
        let mut submissions = self.load().await?;

        let submission = StudentSubmission {
            id: format!("sub-{}", Uuid::new_v4()),
            title: new.title,
            description: new.description,
            resource_type: new.resource_type,
            department: new.department,
            semester: new.semester,
            file_url: new.file_url,
            file_name: new.file_name,
            file_size: new.file_size,
            submitted_at: today(),
            submitted_by: new.submitted_by,
            student_email: new.student_email,
            status: ApprovalStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        };

        submissions.push(submission.clone());
        self.persist(&submissions).await?;
        info!("Stored new submission {}.", submission.id);
        Ok(submission)
    }

    /// Records a review verdict on the submission with `id`.
    ///
    /// The repository does not judge the inputs: it stores whatever reviewer and
    /// reason it is given. The reason is dropped for approvals.
    pub async fn update_status(
        &self,
        id: &str,
        verdict: Verdict,
        reviewed_by: &str,
        rejection_reason: Option<String>,
    ) -> PortResult<UpdateOutcome> {
        self.update_status_if(id, verdict, reviewed_by, rejection_reason, |_| true)
            .await
    }

    /// Like `update_status`, but only writes if `precondition` accepts the
    /// current record. The check and the write happen under one lock.
    pub async fn update_status_if<P>(
        &self,
        id: &str,
        verdict: Verdict,
        reviewed_by: &str,
        rejection_reason: Option<String>,
        precondition: P,
    ) -> PortResult<UpdateOutcome>
    where
        P: FnOnce(&StudentSubmission) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        let mut submissions = self.load().await?;

        let Some(record) = submissions.iter_mut().find(|s| s.id == id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if !precondition(record) {
            return Ok(UpdateOutcome::PreconditionFailed(record.clone()));
        }

        record.status = verdict.into();
        record.reviewed_by = Some(reviewed_by.to_string());
        record.reviewed_at = Some(today());
        record.rejection_reason = match verdict {
            Verdict::Approved => None,
            Verdict::Rejected => rejection_reason,
        };
        let updated = record.clone();

        self.persist(&submissions).await?;
        info!("Submission {} marked {}.", updated.id, updated.status);
        Ok(UpdateOutcome::Updated(updated))
    }

    pub async fn list_approved(&self) -> PortResult<Vec<StudentSubmission>> {
        self.list_by_status(ApprovalStatus::Approved).await
    }

    pub async fn list_by_status(&self, status: ApprovalStatus) -> PortResult<Vec<StudentSubmission>> {
        let mut submissions = self.list().await?;
        submissions.retain(|s| s.status == status);
        Ok(submissions)
    }

    /// Submissions whose student email contains `fragment`, ignoring case.
    /// An empty fragment matches everything.
    pub async fn search_by_email(&self, fragment: &str) -> PortResult<Vec<StudentSubmission>> {
        let needle = fragment.trim().to_lowercase();
        let mut submissions = self.list().await?;
        submissions.retain(|s| s.student_email.to_lowercase().contains(&needle));
        Ok(submissions)
    }

    /// Submissions made by exactly `email`, ignoring case.
    pub async fn list_for_student(&self, email: &str) -> PortResult<Vec<StudentSubmission>> {
        let mut submissions = self.list().await?;
        submissions.retain(|s| s.student_email.eq_ignore_ascii_case(email.trim()));
        Ok(submissions)
    }

    pub async fn status_counts(&self) -> PortResult<StatusCounts> {
        let counts = self
            .list()
            .await?
            .iter()
            .fold(StatusCounts::default(), |mut acc, s| {
                match s.status {
                    ApprovalStatus::Pending => acc.pending += 1,
                    ApprovalStatus::Approved => acc.approved += 1,
                    ApprovalStatus::Rejected => acc.rejected += 1,
                }
                acc
            });
        Ok(counts)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
