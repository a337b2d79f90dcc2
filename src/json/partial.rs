//! Best-effort salvage of `"key": value` pairs from broken payloads.
//!
//! This pass is lossy: values are matched by a non-recursive pattern, so an
//! array or object value is only recovered when it contains no nested array
//! or object of the same kind. Deeper structure is skipped or mis-tokenized.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Upper bound on recovered pairs per payload.
pub const MAX_RECOVERED_KEYS: usize = 256;

/// Only this many leading bytes of the input are scanned.
pub const MAX_PARTIAL_SCAN_BYTES: usize = 1024 * 1024;

static KEY_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""((?:[^"\\]|\\.)+)"\s*:\s*("(?:[^"\\]|\\.)*"|true|false|null|-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?|\[[^\[\]]*\]|\{[^{}]*\})"#,
    )
    .expect("Invalid key/value regex pattern")
});

/// Scan `text` for `"key": value` pairs and collect them into a mapping.
///
/// Each captured value is parsed on its own; if that fails, the raw text
/// (with surrounding quotes removed) is kept as a string. Later duplicates
/// overwrite earlier ones. Returns `None` when no pair was found.
pub fn recover_partial(text: &str) -> Option<Map<String, Value>> {
    let scanned = truncate_at_boundary(text, MAX_PARTIAL_SCAN_BYTES);
    let mut map = Map::new();

    for caps in KEY_VALUE_RE.captures_iter(scanned).take(MAX_RECOVERED_KEYS) {
        let raw_key = &caps[1];
        let raw_value = &caps[2];

        let key = serde_json::from_str::<String>(&format!("\"{}\"", raw_key))
            .unwrap_or_else(|_| raw_key.to_string());
        let value = serde_json::from_str::<Value>(raw_value)
            .unwrap_or_else(|_| Value::String(unquote(raw_value).to_string()));

        tracing::trace!(key = %key, "recovered partial field");
        map.insert(key, value);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
