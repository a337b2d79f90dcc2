//! Command handlers for the docverify CLI.
//!
//! Rendering is kept separate from I/O so the output format can be tested
//! without a terminal or a network.

use std::io::Read;

use color_eyre::eyre::{eyre, Result, WrapErr};
use futures::StreamExt;
use serde_json::json;

use crate::agent::{ingest_agent_text, AgentClient, AgentReply, AgentRequest, AttachmentRef};
use crate::config::AgentConfig;
use crate::sse::{format_event_message, parse_sse_stream, ParsedSseEvent};

use super::args::InputSource;

/// Pretty JSON with the normalized response and its provenance.
pub fn render_reply(reply: &AgentReply) -> String {
    let output = json!({
        "strategy": reply.strategy,
        "response": reply.response,
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
}

/// One line per event: `[type] message`.
pub fn render_event(event: &ParsedSseEvent) -> String {
    format!("[{}] {}", event.event_type, format_event_message(event))
}

/// Output of `docverify parse` for the given body, and whether every
/// parsed item was a success.
pub fn render_parse_output(text: &str, sse: bool, request_id: Option<&str>) -> (String, bool) {
    if sse {
        let events = parse_sse_stream(text, request_id);
        let rendered = events.iter().map(render_event).collect::<Vec<_>>().join("\n");
        (rendered, events.iter().all(ParsedSseEvent::is_success))
    } else {
        let reply = ingest_agent_text(text, request_id);
        (render_reply(&reply), reply.is_success())
    }
}

fn read_input(input: &InputSource) -> Result<String> {
    match input {
        InputSource::Stdin => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .wrap_err("failed to read stdin")?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        InputSource::File(path) => {
            let bytes = std::fs::read(path).wrap_err_with(|| format!("failed to read {}", path))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Handle `docverify parse`. Returns whether the outcome was a success.
pub fn run_parse(input: &InputSource, sse: bool, request_id: Option<&str>) -> Result<bool> {
    let text = read_input(input)?;
    let (rendered, ok) = render_parse_output(&text, sse, request_id);
    println!("{}", rendered);
    Ok(ok)
}

/// Handle `docverify send`. Returns whether the agent reported success.
pub async fn run_send(message: &str, attachments: &[String], stream: bool) -> Result<bool> {
    let config = AgentConfig::from_env();
    let client = AgentClient::from_config(config).map_err(|e| eyre!(e.user_message()))?;

    let request = AgentRequest::new(message)
        .with_attachments(attachments.iter().map(AttachmentRef::new).collect());

    if !stream {
        let reply = client.send(&request).await;
        println!("{}", render_reply(&reply));
        return Ok(reply.is_success());
    }

    let mut events = client.stream(&request).await.map_err(|e| {
        tracing::debug!(
            code = e.error_code(),
            retryable = e.is_retryable(),
            error = %e,
            "stream open failed"
        );
        eyre!("{}\nHint: {}", e.user_message(), e.recovery_hint())
    })?;

    let mut ok = true;
    while let Some(event) = events.next().await {
        println!("{}", render_event(&event));
        ok &= event.is_success();
    }
    Ok(ok)
}
