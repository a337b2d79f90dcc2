//! SSE line, frame-state and parsed-event types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json::{ParseResult, ParseStrategy};

/// Literal data payload that marks the end of a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Well-known event type names.
pub mod event_types {
    /// Default type for frames without an `event:` line
    pub const MESSAGE: &str = "message";
    /// Synthetic completion event produced for `[DONE]`
    pub const DONE: &str = "done";
    pub const TOOL_BLOCKED: &str = "tool_blocked";
    pub const TOOL_ERROR: &str = "tool_error";
    pub const PARSE_ERROR: &str = "parse_error";
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// Transport failure while reading the stream
    pub const STREAM_ERROR: &str = "stream_error";
}

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: tool_blocked")
    Event(String),
    /// Data payload (e.g., "data: {\"status\": \"success\"}")
    Data(String),
    /// Empty line - signals end of frame
    Empty,
    /// Comment line (starts with ':') or a line with an unknown field
    Comment(String),
}

/// Frame reassembly state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// No data buffered
    #[default]
    Idle,
    /// At least one `data:` line buffered for the current frame
    Accumulating,
}

/// One reassembled frame, before JSON parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SseFrame {
    pub event_type: Option<String>,
    pub data_lines: Vec<String>,
}

impl SseFrame {
    /// Declared type, defaulting to `message`.
    pub fn event_type(&self) -> &str {
        self.event_type.as_deref().unwrap_or(event_types::MESSAGE)
    }

    /// Buffered data lines joined with `\n`.
    pub fn data(&self) -> String {
        self.data_lines.join("\n")
    }
}

/// Outcome of parsing one SSE frame.
///
/// On success `outcome.data` holds the event object with `type`,
/// `request_id` (when known) and `timestamp` filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSseEvent {
    pub event_type: String,
    #[serde(flatten)]
    pub outcome: ParseResult<Value>,
}

impl ParsedSseEvent {
    pub fn new(event_type: impl Into<String>, outcome: ParseResult<Value>) -> Self {
        Self {
            event_type: event_type.into(),
            outcome,
        }
    }

    /// A failed event describing a transport problem mid-stream.
    pub fn stream_error(message: impl Into<String>) -> Self {
        Self::new(
            event_types::STREAM_ERROR,
            ParseResult::failed("", message, ParseStrategy::None),
        )
    }

    pub fn is_success(&self) -> bool {
        self.outcome.success
    }

    /// True only for the synthetic `[DONE]` completion event.
    ///
    /// A frame declared `event: done`, or a payload typed `done`, is an
    /// ordinary event and keeps its data.
    pub fn is_done(&self) -> bool {
        self.strategy() == ParseStrategy::SseDone
    }

    pub fn event(&self) -> Option<&Value> {
        self.outcome.data()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error.as_deref()
    }

    pub fn raw(&self) -> Option<&str> {
        self.outcome.raw.as_deref()
    }

    pub fn strategy(&self) -> ParseStrategy {
        self.outcome.strategy
    }

    /// String field of the event payload.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.event().and_then(|v| v.get(key)).and_then(Value::as_str)
    }
}
