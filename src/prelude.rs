//! Prelude module for convenient imports.
//!
//! ```ignore
//! use docverify::prelude::*;
//! ```

// Parsing
pub use crate::json::{parse_json, parse_json_as, ParseResult, ParseStrategy};
pub use crate::normalize::{normalize, normalize_parse_result, NormalizedResponse, ResponseStatus};
pub use crate::sse::{
    dispatch, format_event_message, parse_sse_event, parse_sse_stream, ParsedSseEvent, SseEventHandlers,
    SseParser,
};

// Agent facade
pub use crate::agent::{ingest_agent_body, ingest_agent_text, AgentClient, AgentReply, AgentRequest, AttachmentRef};
pub use crate::config::AgentConfig;
pub use crate::error::{AgentError, AgentResult, ErrorContext, ResultExt};
pub use crate::traits::HttpClient;
