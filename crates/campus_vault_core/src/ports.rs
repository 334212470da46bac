//! crates/campus_vault_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like storage or upstream APIs.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::domain::ChatMessage;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Upstream rate limit reached")]
    RateLimited,
    #[error("Upstream quota exhausted")]
    QuotaExhausted,
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<serde_json::Error> for PortError {
    fn from(e: serde_json::Error) -> Self {
        PortError::Unexpected(format!("JSON error: {}", e))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// An incremental byte stream, as delivered by an upstream service.
pub type ByteStream = Pin<Box<dyn Stream<Item = PortResult<Bytes>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A persistent string key-value store holding JSON blobs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> PortResult<()>;
}

/// An upstream chat-completion service configured for incremental output.
#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Sends the system instruction plus the transcript and returns the raw
    /// server-sent-event byte stream of the completion.
    ///
    /// Rate-limit and quota signals surface as `PortError::RateLimited` and
    /// `PortError::QuotaExhausted` before any bytes are returned.
    async fn stream_completion(
        &self,
        system_instruction: &str,
        transcript: &[ChatMessage],
    ) -> PortResult<ByteStream>;
}
