//! Single-frame event parsing

use chrono::Utc;
use serde_json::{Map, Value};

use crate::json::{parse_json, ParseResult, ParseStrategy};
use crate::sse::events::{event_types, ParsedSseEvent, DONE_SENTINEL};

/// Parse one frame's data payload into a [`ParsedSseEvent`].
///
/// `[DONE]` short-circuits to a synthetic completion event without touching
/// the JSON parser. Otherwise the payload goes through [`parse_json`]; on
/// success the event gets `type` (the payload's own value wins over
/// `declared_type`), `request_id` and `timestamp` filled in when missing.
/// Failures are reported as `parse_error` events carrying the raw text.
pub fn parse_sse_event(declared_type: &str, data: &str, request_id: Option<&str>) -> ParsedSseEvent {
    if data.trim() == DONE_SENTINEL {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(event_types::DONE.to_string()));
        backfill(&mut event, request_id);
        return ParsedSseEvent::new(
            event_types::DONE,
            ParseResult::ok(Value::Object(event), ParseStrategy::SseDone),
        );
    }

    let parsed = parse_json(data);
    let strategy = parsed.strategy;
    match parsed.data {
        Some(value) if parsed.success => {
            let mut event = match value {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("data".to_string(), other);
                    map
                }
            };

            let event_type = match event.get("type").and_then(Value::as_str) {
                Some(own_type) if !own_type.is_empty() => own_type.to_string(),
                _ => {
                    event.insert("type".to_string(), Value::String(declared_type.to_string()));
                    declared_type.to_string()
                }
            };
            backfill(&mut event, request_id);

            ParsedSseEvent::new(event_type, ParseResult::ok(Value::Object(event), strategy))
        }
        _ => {
            tracing::debug!(declared_type, strategy = strategy.as_str(), "SSE frame did not parse");
            ParsedSseEvent::new(
                event_types::PARSE_ERROR,
                ParseResult::failed(
                    data,
                    parsed.error.unwrap_or_else(|| "Unparseable event data".to_string()),
                    strategy,
                ),
            )
        }
    }
}

fn backfill(event: &mut Map<String, Value>, request_id: Option<&str>) {
    if let Some(id) = request_id {
        event
            .entry("request_id")
            .or_insert_with(|| Value::String(id.to_string()));
    }
    event
        .entry("timestamp")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
}
