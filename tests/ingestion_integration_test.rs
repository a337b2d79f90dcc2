//! End-to-end tests of the offline ingestion pipeline: raw agent text in,
//! normalized response or parsed events out.

mod common;

use docverify::json::{parse_json, parse_json_as, ParseStrategy};
use docverify::normalize::{normalize, normalize_parse_result, NormalizedResponse, ResponseStatus};
use docverify::prelude::*;
use docverify::sse::{event_types, SseParser};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

use common::{CANONICAL_REPLY, EVENT_STREAM, PROSE_REPLY, TRUNCATED_REPLY};

#[test]
fn test_canonical_reply_round_trips() {
    let parsed = parse_json(CANONICAL_REPLY);
    assert_eq!(parsed.strategy, ParseStrategy::Direct);

    let response = normalize_parse_result(&parsed);
    let expected: NormalizedResponse = serde_json::from_str(CANONICAL_REPLY).unwrap();
    assert_eq!(response, expected);
}

#[test]
fn test_prose_reply_with_trailing_comma() {
    let reply = ingest_agent_text(PROSE_REPLY, None);

    assert_eq!(reply.strategy, ParseStrategy::ExtractedCleaned);
    assert_eq!(reply.response.status, ResponseStatus::Error);
    assert_eq!(
        reply.response.message.as_deref(),
        Some("Passport expired on 2021-04-30")
    );
    assert_eq!(reply.response.result.get("expired"), Some(&json!(true)));
}

#[test]
fn test_truncated_reply_recovers_flat_fields() {
    let parsed = parse_json(TRUNCATED_REPLY);
    assert!(parsed.is_success());
    assert_eq!(parsed.strategy, ParseStrategy::PartialRecovery);

    let data = parsed.data().unwrap();
    assert_eq!(data["status"], "success");
    assert_eq!(data["result"]["name"], "Jane Doe");
    // The unterminated string value is lost
    assert!(data.get("message").is_none());

    let response = normalize(data);
    assert!(response.is_success());
    assert_eq!(response.result.get("dob"), Some(&json!("1990-01-01")));
}

#[test]
fn test_parse_is_idempotent_on_its_own_output() {
    for input in [CANONICAL_REPLY, PROSE_REPLY, TRUNCATED_REPLY] {
        let first = parse_json(input);
        let data = first.data().unwrap().clone();
        let second = parse_json(&data.to_string());
        assert_eq!(second.strategy, ParseStrategy::Direct);
        assert_eq!(second.data(), Some(&data));
    }
}

#[test]
fn test_typed_parse() {
    #[derive(Debug, Deserialize)]
    struct Verdict {
        status: String,
        result: serde_json::Value,
    }

    let verdict = parse_json_as::<Verdict>(PROSE_REPLY);
    assert!(verdict.is_success());
    let verdict = verdict.into_data().unwrap();
    assert_eq!(verdict.status, "error");
    assert_eq!(verdict.result["expired"], true);

    let mismatch = parse_json_as::<Verdict>("[1, 2, 3]");
    assert!(!mismatch.is_success());
    assert_eq!(mismatch.strategy, ParseStrategy::Direct);
    assert_eq!(mismatch.raw.as_deref(), Some("[1, 2, 3]"));
}

#[test]
fn test_event_stream_body() {
    let events = parse_sse_stream(EVENT_STREAM, Some("req-42"));
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["progress", "tool_error", "message", "done"]);
    assert!(events.iter().all(|e| e.is_success()));
    assert!(events
        .iter()
        .all(|e| e.field_str("request_id") == Some("req-42")));

    // Multi-line data joined with a newline still parses
    assert_eq!(events[2].event().unwrap()["result"]["verified"], false);

    let messages: Vec<String> = events.iter().map(format_event_message).collect();
    assert_eq!(
        messages,
        vec![
            "Running OCR on page 1",
            "Tool error: page 2 unreadable",
            "Event: message",
            "Stream complete",
        ]
    );

    let reply = ingest_agent_text(EVENT_STREAM, Some("req-42"));
    assert!(reply.is_success());
    assert_eq!(reply.response.result.get("reason"), Some(&json!("unreadable page")));
}

#[test]
fn test_parser_matches_batch_parse_line_by_line() {
    let mut parser = SseParser::with_request_id("req-42");
    let mut events = Vec::new();
    for line in EVENT_STREAM.lines() {
        events.extend(parser.feed_line(line));
    }
    events.extend(parser.finish());

    let batch = parse_sse_stream(EVENT_STREAM, Some("req-42"));
    assert_eq!(events.len(), batch.len());
    for (a, b) in events.iter().zip(batch.iter()) {
        assert_eq!(a.event_type, b.event_type);
        assert_eq!(a.strategy(), b.strategy());
    }
}

#[test]
fn test_dispatch_routes_stream_events() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut events = parse_sse_stream(EVENT_STREAM, None);
    events.push(parse_sse_event(event_types::MESSAGE, "{{{ not json", None));

    let (s1, s2, s3) = (seen.clone(), seen.clone(), seen.clone());
    let mut handlers = SseEventHandlers::new()
        .on_success(move |e| s1.lock().unwrap().push(format!("ok:{}", e.event_type)))
        .on_tool_error(move |e| s2.lock().unwrap().push(format!("tool:{}", e.event_type)))
        .on_parse_error(move |e| s3.lock().unwrap().push(format!("parse:{}", e.event_type)));

    for event in &events {
        dispatch(event, &mut handlers);
    }
    drop(handlers);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "ok:progress",
            "tool:tool_error",
            "ok:message",
            "ok:done",
            "parse:parse_error",
        ]
    );
}

#[test]
fn test_nothing_panics_on_hostile_input() {
    let inputs = [
        "",
        "\u{feff}",
        "{",
        "}}}}",
        "\"unterminated",
        "```json",
        "```json\n```",
        "data:",
        "[[[[[[[[[[",
        "{\"a\": [1, 2, {\"b\": }",
        "\u{0}\u{1}\u{2}",
        "🦀 {\"crab\": \"🦀\"",
    ];
    for input in inputs {
        let parsed = parse_json(input);
        let response = normalize_parse_result(&parsed);
        assert!(response.status == ResponseStatus::Success || response.message.is_some());
        let _ = parse_sse_stream(input, None);
        let _ = ingest_agent_text(input, None);
    }
}

fn prefixes(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .map(|(end, _)| end)
        .chain(std::iter::once(text.len()))
        .map(move |end| &text[..end])
}

#[test]
fn test_invariants_hold_for_every_prefix_of_sample_bodies() {
    for body in [CANONICAL_REPLY, PROSE_REPLY, TRUNCATED_REPLY, EVENT_STREAM] {
        for input in prefixes(body) {
            let parsed = parse_json(input);
            if parsed.success {
                assert!(parsed.data.is_some(), "input {:?}", input);
                assert!(parsed.error.is_none(), "input {:?}", input);
                assert!(parsed.strategy.is_producing(), "input {:?}", input);
            } else {
                assert!(parsed.data.is_none(), "input {:?}", input);
                assert!(parsed.raw.is_some(), "input {:?}", input);
                assert!(parsed.error.is_some(), "input {:?}", input);
            }

            for event in parse_sse_stream(input, Some("req-1")) {
                if event.is_success() {
                    assert!(event.event().is_some(), "input {:?}", input);
                    assert_eq!(event.field_str("request_id"), Some("req-1"), "input {:?}", input);
                    assert!(event.field_str("timestamp").is_some(), "input {:?}", input);
                } else {
                    assert!(event.raw().is_some(), "input {:?}", input);
                    assert!(event.error().is_some(), "input {:?}", input);
                }
            }

            let reply = ingest_agent_text(input, None);
            assert_eq!(reply.raw, input);
            let shape = serde_json::to_value(&reply.response).unwrap();
            assert!(shape["status"] == "success" || shape["status"] == "error", "input {:?}", input);
            assert!(shape["result"].is_object(), "input {:?}", input);
        }
    }
}

#[test]
fn test_double_encoded_reply_keeps_structure() {
    let parsed = parse_json(r#"{\n  "status": "success",\n  "result": {"checks": {"mrz": true}}\n}"#);
    assert_eq!(parsed.strategy, ParseStrategy::Cleaned);

    let response = normalize_parse_result(&parsed);
    assert_eq!(response.result.get("checks"), Some(&json!({"mrz": true})));
}

#[test]
fn test_event_stream_with_ids_uses_final_event() {
    let body = "retry: 2000\n\nid: 1\nevent: progress\ndata: {\"message\": \"Reading\"}\n\n\
                id: 2\ndata: {\"status\": \"success\", \"result\": {\"verified\": true}}\n\n";
    let reply = ingest_agent_text(body, Some("req-7"));

    assert!(reply.is_success());
    assert_eq!(reply.response.result.get("verified"), Some(&json!(true)));
}

#[test]
fn test_declared_done_event_is_not_completion() {
    let body = "event: progress\ndata: {\"message\": \"reading\"}\n\n\
                event: done\ndata: {\"status\": \"success\", \"result\": {\"verified\": true}}\n\n";
    let events = parse_sse_stream(body, None);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event_type, event_types::DONE);
    assert!(!events[1].is_done());

    let reply = ingest_agent_text(body, None);
    assert_eq!(reply.response.result.get("verified"), Some(&json!(true)));
}
