//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! failure is reported to HTTP callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use campus_vault_core::ports::PortError;
use campus_vault_core::workflow::WorkflowError;
use tracing::error;

use crate::config::ConfigError;
use crate::web::protocol::ErrorBody;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A submission could not be stored or reviewed.
    #[error("Workflow Error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request did not name a known account.
    #[error("Authentication required")]
    Unauthenticated,

    /// The account is known but its role may not perform the action.
    #[error("Your role may not perform this action")]
    Forbidden,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Port(e) => port_status(e),
            ApiError::Workflow(WorkflowError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Workflow(WorkflowError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Workflow(WorkflowError::AlreadyReviewed { .. }) => StatusCode::CONFLICT,
            ApiError::Workflow(WorkflowError::Port(e)) => port_status(e),
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message shown to callers. Internal details stay in the log.
    fn public_message(&self) -> String {
        match self {
            ApiError::Port(e) | ApiError::Workflow(WorkflowError::Port(e)) => port_message(e),
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                "Internal server error".to_string()
            }
            ApiError::Workflow(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

fn port_status(e: &PortError) -> StatusCode {
    match e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Validation(_) => StatusCode::BAD_REQUEST,
        PortError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        PortError::QuotaExhausted => StatusCode::PAYMENT_REQUIRED,
        PortError::Upstream(_) | PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn port_message(e: &PortError) -> String {
    match e {
        PortError::RateLimited => "Too many requests, please try again later.".to_string(),
        PortError::QuotaExhausted => "AI credits exhausted. Please try again later.".to_string(),
        PortError::Upstream(_) => "AI service error".to_string(),
        PortError::Unexpected(_) => "Internal server error".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_vault_core::ApprovalStatus;

    #[test]
    fn maps_each_failure_to_its_status() {
        let cases = [
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (ApiError::Port(PortError::RateLimited), StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Port(PortError::QuotaExhausted), StatusCode::PAYMENT_REQUIRED),
            (
                ApiError::Port(PortError::Upstream("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Workflow(WorkflowError::AlreadyReviewed {
                    id: "sub-2".into(),
                    status: ApprovalStatus::Approved,
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Workflow(WorkflowError::NotFound("sub-9".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Workflow(WorkflowError::Validation("title".into())),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{}", error);
        }
    }

    #[test]
    fn hides_internal_details_from_callers() {
        let error = ApiError::Port(PortError::Upstream("401 from gateway: bad key".into()));
        assert_eq!(error.public_message(), "AI service error");
        let error = ApiError::Internal("disk on fire".into());
        assert_eq!(error.public_message(), "Internal server error");
    }
}
