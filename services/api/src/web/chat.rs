//! services/api/src/web/chat.rs
//!
//! The FAQ relay endpoint. The upstream event stream is passed through
//! byte-for-byte; dropping the response drops the upstream connection.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::protocol::{ChatRequest, ErrorBody};
use crate::web::state::AppState;

/// Streams the assistant's reply to a transcript as server-sent events.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Upstream event stream", content_type = "text/event-stream", body = String),
        (status = 400, description = "Empty transcript or last message not from the user", body = ErrorBody),
        (status = 402, description = "AI credits exhausted", body = ErrorBody),
        (status = 429, description = "Upstream rate limit", body = ErrorBody),
        (status = 500, description = "Relay not configured or upstream failure", body = ErrorBody)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let relay = state
        .chat
        .as_ref()
        .ok_or_else(|| ConfigError::MissingVar("CHAT_API_KEY".to_string()))?;

    let stream = relay.relay(&request.messages).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
