//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the upstream chat-completion gateway.
//! It implements the `ChatCompletionService` port from the `core` crate and
//! hands back the gateway's event stream without re-encoding it.

use async_trait::async_trait;
use campus_vault_core::ports::{ByteStream, ChatCompletionService, PortError, PortResult};
use campus_vault_core::ChatMessage;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

//=========================================================================================
// Wire Payload
//=========================================================================================

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

fn build_request<'a>(
    model: &'a str,
    system_instruction: &'a str,
    transcript: &'a [ChatMessage],
) -> CompletionRequest<'a> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(WireMessage {
        role: "system",
        content: system_instruction,
    });
    messages.extend(transcript.iter().map(|m| WireMessage {
        role: match m.role {
            campus_vault_core::ChatRole::User => "user",
            campus_vault_core::ChatRole::Assistant => "assistant",
        },
        content: &m.content,
    }));
    CompletionRequest {
        model,
        messages,
        stream: true,
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatCompletionService` against an
/// OpenAI-compatible streaming endpoint.
#[derive(Clone)]
pub struct UpstreamChatAdapter {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    /// Bounds the wait for response headers; the body may stream for longer.
    header_timeout: Duration,
}

impl UpstreamChatAdapter {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        header_timeout: Duration,
    ) -> PortResult<Self> {
        let client = Client::builder()
            .connect_timeout(header_timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            header_timeout,
        })
    }
}

//=========================================================================================
// `ChatCompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatCompletionService for UpstreamChatAdapter {
    async fn stream_completion(
        &self,
        system_instruction: &str,
        transcript: &[ChatMessage],
    ) -> PortResult<ByteStream> {
        let body = build_request(&self.model, system_instruction, transcript);
        debug!("Requesting completion for {} messages.", transcript.len());

        let request = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();
        let response = tokio::time::timeout(self.header_timeout, request)
            .await
            .map_err(|_| PortError::Upstream("timed out waiting for the AI gateway".to_string()))?
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => return Err(PortError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => return Err(PortError::QuotaExhausted),
            s if !s.is_success() => {
                let detail = response.text().await.unwrap_or_default();
                error!("AI gateway returned {}: {}", s, detail);
                return Err(PortError::Upstream(format!("gateway returned {}", s)));
            }
            _ => {}
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| PortError::Upstream(e.to_string())));
        Ok(Box::pin(stream))
    }
}
