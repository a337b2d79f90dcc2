//! SSE (Server-Sent Events) stream parser
//!
//! Reassembles agent event streams into parsed events.
//! SSE format consists of:
//! - `event: <type>` - event type line
//! - `data: <payload>` - data payload line (may repeat within a frame)
//! - Empty line - signals end of frame
//! - Lines starting with `:` - comments (ignored)
//!
//! Each frame's data is run through the JSON recovery parser; a literal
//! `[DONE]` payload becomes a synthetic completion event instead.
//!
//! # Module structure
//! - `events` - Line, frame and parsed-event types
//! - `parser` - Frame reassembly (SseParser, parse_sse_stream, parse_sse_event)
//! - `dispatch` - Routing events to named handler slots
//! - `format` - One-line messages for events

mod dispatch;
mod events;
mod format;
mod parser;

// Re-export public types
pub use dispatch::{dispatch, SseEventHandlers};
pub use events::{event_types, FrameState, ParsedSseEvent, SseFrame, SseLine, DONE_SENTINEL};
pub use format::format_event_message;
pub use parser::{looks_like_sse, parse_sse_event, parse_sse_line, parse_sse_stream, SseParser};
