//! crates/campus_vault_core/src/chat.rs
//!
//! The FAQ chat: a memoryless relay in front of the upstream completion
//! service, and the consumer side that turns the streamed reply into a growing
//! assistant message.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{ChatMessage, ChatRole};
use crate::ports::{ByteStream, ChatCompletionService, PortError, PortResult};
use crate::sse::{sse_events, StreamEvent};

/// Scopes the assistant to questions about the portal.
pub const FAQ_SYSTEM_INSTRUCTION: &str = r#"You are CampusVault FAQ Assistant, a friendly, concise helper for students and faculty using the CampusVault academic resource platform.

Answer questions about:
- How to browse, search, and filter resources (notes, timetables, syllabi, assignments)
- How to view and download files (login required for downloads, 10-second preview for guests)
- How to submit resources as a student
- How bookmarks work
- The PYQ (Previous Year Questions) section
- The faculty dashboard for reviewing submissions
- Account roles: admin, teacher, student
- The login and signup process

Keep answers short (2-4 sentences). If a question is outside the platform scope, politely say you can only help with CampusVault-related queries."#;

/// Shown in place of a reply when the stream cannot be obtained or breaks.
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again!";

//=========================================================================================
// Relay
//=========================================================================================

/// Forwards a full transcript upstream and hands back the raw event stream.
/// Keeps no conversation state between calls.
#[derive(Clone)]
pub struct ChatRelay {
    upstream: Arc<dyn ChatCompletionService>,
    system_instruction: String,
}

impl ChatRelay {
    pub fn new(upstream: Arc<dyn ChatCompletionService>) -> Self {
        Self::with_instruction(upstream, FAQ_SYSTEM_INSTRUCTION)
    }

    pub fn with_instruction(
        upstream: Arc<dyn ChatCompletionService>,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            upstream,
            system_instruction: system_instruction.into(),
        }
    }

    /// A transcript must end with a non-blank user message.
    pub fn validate_transcript(messages: &[ChatMessage]) -> PortResult<()> {
        match messages.last() {
            None => Err(PortError::Validation("messages must not be empty".to_string())),
            Some(last) if last.role != ChatRole::User => Err(PortError::Validation(
                "the last message must come from the user".to_string(),
            )),
            Some(last) if last.content.trim().is_empty() => Err(PortError::Validation(
                "the last message must not be blank".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    pub async fn relay(&self, messages: &[ChatMessage]) -> PortResult<ByteStream> {
        Self::validate_transcript(messages)?;
        info!("Relaying chat transcript of {} messages.", messages.len());
        self.upstream
            .stream_completion(&self.system_instruction, messages)
            .await
    }
}

//=========================================================================================
// Consumer
//=========================================================================================

/// How a streamed reply ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    /// The consumer went away; the transcript was left as it was.
    Cancelled,
    /// The apology message was appended.
    Failed,
}

/// A conversation as seen by the chat UI.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Records the user's message and returns the transcript to send, or
    /// `None` when the text is blank.
    pub fn begin_turn(&mut self, text: &str) -> Option<Vec<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(text));
        Some(self.messages.clone())
    }

    /// Shows `snapshot` as the current assistant reply, replacing the last
    /// message if it already is the assistant's.
    pub fn show_assistant_snapshot(&mut self, snapshot: &str) {
        match self.messages.last_mut() {
            Some(last) if last.role == ChatRole::Assistant => {
                last.content = snapshot.to_string();
            }
            _ => self.messages.push(ChatMessage::assistant(snapshot)),
        }
    }

    pub fn fail(&mut self) {
        self.messages.push(ChatMessage::assistant(APOLOGY));
    }

    /// Reads a streamed reply to the end, updating the last assistant message
    /// after every fragment and calling `on_update` with the running text.
    ///
    /// Once `cancel` fires, nothing further is read or written.
    pub async fn consume<S, F>(
        &mut self,
        bytes: S,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> SessionOutcome
    where
        S: Stream<Item = PortResult<Bytes>> + Send + 'static,
        F: FnMut(&str),
    {
        let events = sse_events(bytes);
        futures::pin_mut!(events);
        let mut reply = String::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Chat stream consumer cancelled.");
                    return SessionOutcome::Cancelled;
                }
                next = events.next() => next,
            };

            match next {
                Some(Ok(StreamEvent::Delta(fragment))) => {
                    reply.push_str(&fragment);
                    self.show_assistant_snapshot(&reply);
                    on_update(&reply);
                }
                Some(Ok(StreamEvent::Done)) | None => return SessionOutcome::Completed,
                Some(Err(e)) => {
                    warn!("Chat stream failed: {}", e);
                    self.fail();
                    return SessionOutcome::Failed;
                }
            }
        }
    }

    /// Sends `text` through `relay` and consumes the reply in-process.
    pub async fn send<F>(
        &mut self,
        relay: &ChatRelay,
        text: &str,
        cancel: &CancellationToken,
        on_update: F,
    ) -> Option<SessionOutcome>
    where
        F: FnMut(&str),
    {
        let transcript = self.begin_turn(text)?;
        match relay.relay(&transcript).await {
            Ok(stream) => Some(self.consume(stream, cancel, on_update).await),
            Err(e) => {
                warn!("Chat relay refused the request: {}", e);
                self.fail();
                Some(SessionOutcome::Failed)
            }
        }
    }
}
