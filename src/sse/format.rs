//! Human-readable messages for parsed events.

use crate::sse::events::{event_types, ParsedSseEvent};

/// Render a one-line status message for an event.
pub fn format_event_message(event: &ParsedSseEvent) -> String {
    if !event.is_success() {
        let error = event.error().unwrap_or("unknown error");
        return match event.event_type.as_str() {
            event_types::STREAM_ERROR => format!("Stream error: {}", error),
            _ => format!("Parse error: {}", error),
        };
    }

    match event.event_type.as_str() {
        event_types::TOOL_BLOCKED => format!(
            "Tool blocked: {}",
            first_field(event, &["reason", "message"]).unwrap_or("no reason given")
        ),
        event_types::TOOL_ERROR => format!(
            "Tool error: {}",
            first_field(event, &["error", "message"]).unwrap_or("unknown error")
        ),
        event_types::VALIDATION_ERROR => format!(
            "Validation error: {}",
            first_field(event, &["message", "error"]).unwrap_or("validation failed")
        ),
        event_types::PARSE_ERROR => format!(
            "Parse error: {}",
            first_field(event, &["error", "message"]).unwrap_or("unknown error")
        ),
        event_types::DONE if event.is_done() => "Stream complete".to_string(),
        other => match event.field_str("message") {
            Some(message) => message.to_string(),
            None => format!("Event: {}", other),
        },
    }
}

fn first_field<'e>(event: &'e ParsedSseEvent, keys: &[&str]) -> Option<&'e str> {
    keys.iter().find_map(|key| event.field_str(key))
}
