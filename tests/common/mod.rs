//! Common test utilities for integration tests.
//!
//! Sample agent bodies in the shapes seen from the verification agent, and a
//! helper for pointing an [`AgentConfig`] at a mock server.

#![allow(dead_code)]

use docverify::config::AgentConfig;

/// A clean, canonical verification reply.
pub const CANONICAL_REPLY: &str = r#"{
  "status": "success",
  "result": {"document_type": "passport", "verified": true, "confidence": 0.93},
  "message": "Document verified",
  "metadata": {"model": "ocr-v2", "pages": 2}
}"#;

/// Reply wrapped in chatty prose and a code fence.
pub const PROSE_REPLY: &str = "Sure! I checked the upload.\n\n```json\n{\n  \"status\": \"error\",\n  \"result\": {\"expired\": true},\n  \"message\": \"Passport expired on 2021-04-30\",\n}\n```\n\nLet me know if you need anything else.";

/// Reply cut off mid-object.
pub const TRUNCATED_REPLY: &str = r#"{"status": "success", "result": {"name": "Jane Doe", "dob": "1990-01-01"}, "message": "Extracted fiel"#;

/// A complete event stream as one body.
pub const EVENT_STREAM: &str = "\
: keep-alive

event: progress
data: {\"message\": \"Running OCR on page 1\"}

event: tool_error
data: {\"error\": \"page 2 unreadable\"}

data: {\"status\": \"success\",
data:  \"result\": {\"verified\": false, \"reason\": \"unreadable page\"}}

data: [DONE]

";

pub fn config_for(base_url: &str) -> AgentConfig {
    AgentConfig::default()
        .with_base_url(base_url)
        .with_api_key("test-key")
        .with_agent_id("doc-verifier")
        .with_request_timeout_secs(5)
}
