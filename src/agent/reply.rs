//! Turning raw agent text into a guaranteed-shape reply.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::json::{parse_json, ParseStrategy};
use crate::normalize::{normalize, NormalizedResponse};
use crate::sse::{event_types, format_event_message, looks_like_sse, parse_sse_stream, ParsedSseEvent};

/// A normalized response plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    pub response: NormalizedResponse,
    /// Strategy that produced the payload behind `response`
    pub strategy: ParseStrategy,
    /// Body exactly as received
    pub raw: String,
}

impl AgentReply {
    pub fn new(response: NormalizedResponse, strategy: ParseStrategy, raw: impl Into<String>) -> Self {
        Self {
            response,
            strategy,
            raw: raw.into(),
        }
    }

    /// Reply for a call that never produced a body.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(NormalizedResponse::error(message), ParseStrategy::None, "")
    }

    pub fn is_success(&self) -> bool {
        self.response.is_success()
    }
}

fn is_error_event(event: &ParsedSseEvent) -> bool {
    matches!(
        event.event_type.as_str(),
        event_types::TOOL_BLOCKED | event_types::TOOL_ERROR | event_types::VALIDATION_ERROR
    )
}

fn reply_from_events(events: &[ParsedSseEvent], raw: &str) -> AgentReply {
    let last_payload = events
        .iter()
        .rev()
        .find(|event| event.is_success() && !event.is_done());

    if let Some(event) = last_payload {
        debug!(event_type = %event.event_type, count = events.len(), "using last stream event as reply");
        let response = if is_error_event(event) {
            NormalizedResponse::error(format_event_message(event))
        } else {
            event
                .event()
                .map(normalize)
                .unwrap_or_else(|| normalize(&Value::Null))
        };
        return AgentReply::new(response, event.strategy(), raw);
    }

    if let Some(failed) = events.iter().rev().find(|event| !event.is_success()) {
        let error = failed.error().unwrap_or("unknown error");
        return AgentReply::new(
            NormalizedResponse::error(format!("Unable to parse agent response: {}", error)),
            failed.strategy(),
            raw,
        );
    }

    // Only completion markers, or nothing at all.
    let strategy = events
        .last()
        .map(ParsedSseEvent::strategy)
        .unwrap_or(ParseStrategy::None);
    AgentReply::new(normalize(&Value::Null), strategy, raw)
}

/// Run a complete agent body through the ingestion pipeline.
///
/// Event-stream bodies are reassembled and the last successful payload wins.
/// JSON (clean or buried in prose) is recovered and normalized. Prose with no
/// JSON at all becomes a success carrying `{"text": <raw>}` with strategy
/// `raw_fallback`. Blank input yields the empty-response error. Never fails.
pub fn ingest_agent_text(raw: &str, request_id: Option<&str>) -> AgentReply {
    ingest_agent_body(raw, request_id, false)
}

/// Same as [`ingest_agent_text`], for a body the transport already labelled.
///
/// With `event_stream` set (a `text/event-stream` content type) the body is
/// reassembled as SSE even when its first line would not give it away.
pub fn ingest_agent_body(raw: &str, request_id: Option<&str>, event_stream: bool) -> AgentReply {
    if event_stream || looks_like_sse(raw) {
        let events = parse_sse_stream(raw, request_id);
        return reply_from_events(&events, raw);
    }

    let parsed = parse_json(raw);
    if let Some(data) = parsed.data() {
        return AgentReply::new(normalize(data), parsed.strategy, raw);
    }

    if raw.trim().is_empty() {
        return AgentReply::new(normalize(&Value::Null), ParseStrategy::None, raw);
    }

    debug!(len = raw.len(), "agent replied with plain text");
    let mut result = Map::new();
    result.insert("text".to_string(), Value::String(raw.trim().to_string()));
    AgentReply::new(NormalizedResponse::success(result), ParseStrategy::RawFallback, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{ResponseStatus, EMPTY_RESPONSE_MESSAGE};
    use serde_json::json;

    #[test]
    fn test_clean_json_reply() {
        let raw = r#"{"status":"success","result":{"verified":true},"message":"ok"}"#;
        let reply = ingest_agent_text(raw, None);

        assert!(reply.is_success());
        assert_eq!(reply.strategy, ParseStrategy::Direct);
        assert_eq!(reply.response.result.get("verified"), Some(&json!(true)));
        assert_eq!(reply.response.message.as_deref(), Some("ok"));
        assert_eq!(reply.raw, raw);
    }

    #[test]
    fn test_json_in_prose() {
        let raw = "Here is the result:\n```json\n{\"status\":\"error\",\"message\":\"Expired ID\"}\n```";
        let reply = ingest_agent_text(raw, None);

        assert_eq!(reply.response.status, ResponseStatus::Error);
        assert_eq!(reply.response.message.as_deref(), Some("Expired ID"));
        assert_eq!(reply.strategy, ParseStrategy::Extracted);
    }

    #[test]
    fn test_plain_prose_becomes_text_result() {
        let reply = ingest_agent_text("  The document looks authentic.  ", None);

        assert!(reply.is_success());
        assert_eq!(reply.strategy, ParseStrategy::RawFallback);
        assert_eq!(
            reply.response.result.get("text"),
            Some(&json!("The document looks authentic."))
        );
    }

    #[test]
    fn test_blank_body_is_empty_response() {
        let reply = ingest_agent_text("   \n", None);
        assert_eq!(reply.response.status, ResponseStatus::Error);
        assert_eq!(reply.response.message.as_deref(), Some(EMPTY_RESPONSE_MESSAGE));
        assert_eq!(reply.strategy, ParseStrategy::None);
    }

    #[test]
    fn test_sse_body_uses_last_payload_event() {
        let raw = "event: progress\ndata: {\"message\":\"reading\"}\n\n\
                   data: {\"status\":\"success\",\"result\":{\"score\":0.97}}\n\n\
                   data: [DONE]\n\n";
        let reply = ingest_agent_text(raw, Some("req-1"));

        assert!(reply.is_success());
        assert_eq!(reply.strategy, ParseStrategy::Direct);
        assert_eq!(reply.response.result.get("score"), Some(&json!(0.97)));
    }

    #[test]
    fn test_sse_error_event_becomes_error_reply() {
        let raw = "data: {\"type\":\"tool_blocked\",\"reason\":\"policy\"}\n\ndata: [DONE]\n\n";
        let reply = ingest_agent_text(raw, None);

        assert_eq!(reply.response.status, ResponseStatus::Error);
        assert_eq!(reply.response.message.as_deref(), Some("Tool blocked: policy"));
    }

    #[test]
    fn test_sse_only_done_is_empty_response() {
        let reply = ingest_agent_text("data: [DONE]\n\n", None);
        assert_eq!(reply.response.message.as_deref(), Some(EMPTY_RESPONSE_MESSAGE));
        assert_eq!(reply.strategy, ParseStrategy::SseDone);
    }

    #[test]
    fn test_sse_only_garbage_is_parse_error() {
        let reply = ingest_agent_text("data: <<<>>>\n\n", None);
        assert_eq!(reply.response.status, ResponseStatus::Error);
        assert!(reply
            .response
            .message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Unable to parse agent response:"));
        assert_eq!(reply.strategy, ParseStrategy::RawFallback);
    }

    #[test]
    fn test_sse_with_id_lines_uses_last_event() {
        let raw = "id: 1\ndata: {\"status\":\"success\",\"result\":{\"a\":1}}\n\n\
                   id: 2\ndata: {\"status\":\"success\",\"result\":{\"a\":2}}\n\n";
        let reply = ingest_agent_text(raw, None);

        assert_eq!(reply.strategy, ParseStrategy::Direct);
        assert_eq!(reply.response.result.get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_labelled_event_stream_is_reassembled() {
        let raw = "\n\nfield: x\ndata: {\"result\":{\"a\":1}}\n\ndata: {\"result\":{\"a\":2}}\n\n";
        assert_eq!(
            ingest_agent_text(raw, None).response.result.get("a"),
            Some(&json!(1))
        );

        let reply = ingest_agent_body(raw, None, true);
        assert_eq!(reply.response.result.get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_declared_done_frame_keeps_its_payload() {
        let raw = "data: {\"message\":\"reading\"}\n\n\
                   event: done\ndata: {\"status\":\"success\",\"result\":{\"verified\":true}}\n\n\
                   data: [DONE]\n\n";
        let reply = ingest_agent_text(raw, None);

        assert!(reply.is_success());
        assert_eq!(reply.response.result.get("verified"), Some(&json!(true)));
    }

    #[test]
    fn test_failure_reply() {
        let reply = AgentReply::failure("offline");
        assert!(!reply.is_success());
        assert_eq!(reply.raw, "");
        assert_eq!(reply.strategy, ParseStrategy::None);
    }
}
