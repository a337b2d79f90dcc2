//! SSE frame reassembly.
//!
//! Contains the stateful SseParser for accumulating lines into frames and
//! handing each completed frame to the single-event parser.

mod event;

pub use event::parse_sse_event;

use crate::sse::events::{FrameState, ParsedSseEvent, SseFrame, SseLine};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.trim().is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        // Only the single separator space belongs to the framing
        let payload = rest.strip_prefix(' ').unwrap_or(rest);
        return SseLine::Data(payload.to_string());
    }

    // Unknown field (id:, retry:, ...) - treat as comment
    SseLine::Comment(line.to_string())
}

/// Stateful SSE parser that accumulates lines and emits parsed events.
///
/// A frame is flushed by a blank line or by [`SseParser::finish`] at end of
/// input. Frames without data lines produce nothing. An `event:` line in the
/// middle of a frame only updates its declared type.
#[derive(Debug, Default)]
pub struct SseParser {
    frame: SseFrame,
    request_id: Option<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that back-fills `request_id` on every event.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            frame: SseFrame::default(),
            request_id: Some(request_id.into()),
        }
    }

    /// Current reassembly state.
    pub fn state(&self) -> FrameState {
        if self.frame.data_lines.is_empty() {
            FrameState::Idle
        } else {
            FrameState::Accumulating
        }
    }

    /// Feed a line (without its trailing newline) to the parser.
    ///
    /// Returns `Some(event)` when the line completed a frame.
    pub fn feed_line(&mut self, line: &str) -> Option<ParsedSseEvent> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                self.frame.event_type = Some(event_type);
                None
            }
            SseLine::Data(data) => {
                self.frame.data_lines.push(data);
                None
            }
            SseLine::Empty => self.flush(),
            SseLine::Comment(_) => None,
        }
    }

    /// Flush whatever is buffered at end of input.
    pub fn finish(&mut self) -> Option<ParsedSseEvent> {
        self.flush()
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.frame = SseFrame::default();
    }

    fn flush(&mut self) -> Option<ParsedSseEvent> {
        let frame = std::mem::take(&mut self.frame);
        if frame.data_lines.is_empty() {
            return None;
        }
        Some(parse_sse_event(
            frame.event_type(),
            &frame.data(),
            self.request_id.as_deref(),
        ))
    }
}

/// Parse a complete event-stream text block into events, in arrival order.
pub fn parse_sse_stream(raw: &str, request_id: Option<&str>) -> Vec<ParsedSseEvent> {
    let mut parser = match request_id {
        Some(id) => SseParser::with_request_id(id),
        None => SseParser::new(),
    };

    let mut events: Vec<ParsedSseEvent> = raw
        .split('\n')
        .filter_map(|line| parser.feed_line(line))
        .collect();
    events.extend(parser.finish());

    tracing::debug!(count = events.len(), "parsed SSE stream");
    events
}

/// Field names that may open an event-stream line.
const SSE_FIELD_PREFIXES: [&str; 4] = ["data:", "event:", "id:", "retry:"];

/// Heuristic check whether a text body is an event stream rather than JSON.
///
/// True when the first non-empty line is an SSE field or a comment.
pub fn looks_like_sse(text: &str) -> bool {
    text.lines()
        .map(str::trim_start)
        .find(|line| !line.is_empty())
        .map(|line| {
            line.starts_with(':') || SSE_FIELD_PREFIXES.iter().any(|field| line.starts_with(field))
        })
        .unwrap_or(false)
}
