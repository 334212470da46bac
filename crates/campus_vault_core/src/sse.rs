//! crates/campus_vault_core/src/sse.rs
//!
//! Incremental decoding of a chat-completion server-sent-event stream.
//!
//! Bytes arrive in arbitrary chunks: a chunk may end in the middle of a line or
//! even in the middle of a UTF-8 sequence. The decoder buffers whatever it
//! cannot interpret yet and only ever parses complete lines, so the events it
//! produces do not depend on where the chunk boundaries fall.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::warn;

use crate::ports::PortResult;

/// Payload that marks the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data: ";

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental text fragment of the assistant's reply.
    Delta(String),
    /// The upstream signalled the end of the completion.
    Done,
}

#[derive(Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

enum Line {
    Ignored,
    Done,
    Data(Option<String>),
    Malformed,
}

fn classify(line: &str) -> Line {
    if line.starts_with(':') || line.trim().is_empty() {
        return Line::Ignored;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Line::Ignored;
    };

    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return Line::Done;
    }

    match serde_json::from_str::<ChunkPayload>(payload) {
        Ok(chunk) => Line::Data(
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta)
                .and_then(|d| d.content)
                .filter(|content| !content.is_empty()),
        ),
        Err(_) => Line::Malformed,
    }
}

/// State of an in-progress stream decode.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Decoded text not yet terminated by a newline.
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending_bytes: Vec<u8>,
    /// The head of `buffer` is a line that already failed to parse once.
    retrying: bool,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the end-of-stream sentinel has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds one chunk of bytes and returns the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }
        self.decode(chunk);
        self.drain_lines()
    }

    /// Flushes the decoder at end of input, treating an unterminated final
    /// line as complete.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        if !self.pending_bytes.is_empty() {
            let tail = std::mem::take(&mut self.pending_bytes);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }

        loop {
            events.extend(self.drain_lines());
            if !self.retrying || self.finished {
                break;
            }
        }
        self.finished = true;
        events
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending_bytes.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending_bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending_bytes.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // `None` means the sequence is merely cut off; keep it for the next chunk.
                    let keep_from = match e.error_len() {
                        None => valid,
                        Some(len) => valid + len,
                    };
                    let rest = self.pending_bytes.split_off(keep_from);
                    let decoded = std::mem::replace(&mut self.pending_bytes, rest);
                    self.buffer.push_str(&String::from_utf8_lossy(&decoded));
                    if e.error_len().is_none() {
                        return;
                    }
                }
            }
        }
    }

    fn drain_lines(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            let is_retry = std::mem::take(&mut self.retrying);

            match classify(&line) {
                Line::Ignored | Line::Data(None) => {}
                Line::Data(Some(text)) => events.push(StreamEvent::Delta(text)),
                Line::Done => {
                    self.finished = true;
                    self.buffer.clear();
                    events.push(StreamEvent::Done);
                    break;
                }
                Line::Malformed if is_retry => {
                    warn!("Skipping unparseable stream line: {}", line);
                }
                Line::Malformed => {
                    // Put it back and give it one more chance with the next chunk.
                    self.buffer.insert_str(0, &format!("{}\n", line));
                    self.retrying = true;
                    break;
                }
            }
        }
        events
    }
}

/// Adapts a byte stream into a lazy stream of decoded events.
///
/// The event stream is finite: it ends after `Done`, when the byte stream
/// ends, or after the first transport error.
pub fn sse_events<S>(bytes: S) -> impl Stream<Item = PortResult<StreamEvent>> + Send
where
    S: Stream<Item = PortResult<Bytes>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut decoder = SseDecoder::new();
        futures::pin_mut!(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for event in decoder.push(&chunk) {
                yield event;
            }
            if decoder.is_finished() {
                break;
            }
        }

        for event in decoder.finish() {
            yield event;
        }
    }
}
