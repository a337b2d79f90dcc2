//! Multi-strategy JSON recovery for untrusted agent output.
//!
//! Agent replies arrive as plain JSON, JSON wrapped in prose or markdown
//! fences, JSON with trailing commas or stray control characters, or JSON cut
//! off mid-stream. [`parse_json`] tries a fixed sequence of strategies, from
//! strictest to most lenient, and reports which one produced the value:
//!
//! 1. `direct` - the trimmed input parses as-is
//! 2. `cleaned` - the input parses after [`sanitize_json_text`]
//! 3. `extracted` / `extracted_cleaned` - a fenced block or the first balanced
//!    `{...}` / `[...]` span parses (optionally after sanitizing)
//! 4. `partial_recovery` - individual `"key": value` pairs are salvaged
//! 5. `raw_fallback` - nothing worked; the trimmed input is returned as `raw`
//!
//! # Module structure
//! - `extract` - fenced block and balanced-delimiter extraction
//! - `sanitize` - textual repairs applied before re-parsing
//! - `partial` - regex-based key/value salvage

mod extract;
mod partial;
mod sanitize;

pub use extract::{extract_balanced, extract_fenced_block, extract_json_region};
pub use partial::{recover_partial, MAX_PARTIAL_SCAN_BYTES, MAX_RECOVERED_KEYS};
pub use sanitize::sanitize_json_text;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which technique produced a [`ParseResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    Direct,
    Cleaned,
    Extracted,
    ExtractedCleaned,
    PartialRecovery,
    RawFallback,
    /// Synthetic stream-completion event, no JSON was parsed
    SseDone,
    /// Nothing to parse (empty or absent input)
    None,
}

impl ParseStrategy {
    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStrategy::Direct => "direct",
            ParseStrategy::Cleaned => "cleaned",
            ParseStrategy::Extracted => "extracted",
            ParseStrategy::ExtractedCleaned => "extracted_cleaned",
            ParseStrategy::PartialRecovery => "partial_recovery",
            ParseStrategy::RawFallback => "raw_fallback",
            ParseStrategy::SseDone => "sse_done",
            ParseStrategy::None => "none",
        }
    }

    /// Returns true for strategies that yield a value.
    pub fn is_producing(&self) -> bool {
        !matches!(self, ParseStrategy::RawFallback | ParseStrategy::None)
    }
}

impl std::fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of interpreting a text payload as a value of type `T`.
///
/// Built only through [`ParseResult::ok`] and [`ParseResult::failed`]:
/// a success always carries `data`, a failure always carries `raw` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub strategy: ParseStrategy,
}

impl<T> ParseResult<T> {
    /// A successful parse.
    pub fn ok(data: T, strategy: ParseStrategy) -> Self {
        Self {
            success: true,
            data: Some(data),
            raw: None,
            error: None,
            strategy,
        }
    }

    /// A failed parse, keeping the unparsed text for diagnostics.
    pub fn failed(raw: impl Into<String>, error: impl Into<String>, strategy: ParseStrategy) -> Self {
        Self {
            success: false,
            data: None,
            raw: Some(raw.into()),
            error: Some(error.into()),
            strategy,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Transform the parsed value, keeping strategy and diagnostics.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ParseResult<U> {
        ParseResult {
            success: self.success,
            data: self.data.map(f),
            raw: self.raw,
            error: self.error,
            strategy: self.strategy,
        }
    }
}

/// Parse untrusted text into a JSON value using every recovery strategy.
///
/// Never panics and never returns `Err`; see the module docs for the order.
pub fn parse_json(input: &str) -> ParseResult<Value> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ParseResult::failed("", "Empty input", ParseStrategy::None);
    }

    let direct_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return ParseResult::ok(value, ParseStrategy::Direct),
        Err(e) => e.to_string(),
    };
    tracing::trace!(error = %direct_error, "direct JSON parse failed");

    let cleaned = sanitize_json_text(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        tracing::debug!(strategy = "cleaned", "recovered JSON payload");
        return ParseResult::ok(value, ParseStrategy::Cleaned);
    }

    if let Some((value, strategy)) = parse_extracted(trimmed) {
        tracing::debug!(strategy = strategy.as_str(), "recovered JSON payload");
        return ParseResult::ok(value, strategy);
    }

    if let Some(map) = recover_partial(trimmed) {
        tracing::debug!(
            strategy = "partial_recovery",
            keys = map.len(),
            "recovered JSON payload"
        );
        return ParseResult::ok(Value::Object(map), ParseStrategy::PartialRecovery);
    }

    tracing::debug!(len = trimmed.len(), "no JSON strategy succeeded");
    ParseResult::failed(
        trimmed,
        format!("No JSON could be recovered: {}", direct_error),
        ParseStrategy::RawFallback,
    )
}

/// Parse optional input; `None` is treated as a failed, strategy-less parse.
pub fn parse_json_opt(input: Option<&str>) -> ParseResult<Value> {
    match input {
        Some(text) => parse_json(text),
        None => ParseResult::failed("", "No input provided", ParseStrategy::None),
    }
}

/// Parse untrusted text and deserialize the recovered value into `T`.
pub fn parse_json_as<T: DeserializeOwned>(input: &str) -> ParseResult<T> {
    let parsed = parse_json(input);
    let strategy = parsed.strategy;
    match parsed.data {
        Some(value) => match serde_json::from_value::<T>(value) {
            Ok(data) => ParseResult::ok(data, strategy),
            Err(e) => ParseResult::failed(
                input.trim(),
                format!("Recovered JSON does not match the expected shape: {}", e),
                strategy,
            ),
        },
        None => ParseResult {
            success: false,
            data: None,
            raw: parsed.raw,
            error: parsed.error,
            strategy,
        },
    }
}

/// Strategy 3: a fenced block or balanced span, parsed directly then cleaned.
fn parse_extracted(text: &str) -> Option<(Value, ParseStrategy)> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(fenced) = extract_fenced_block(text) {
        candidates.push(fenced);
    }
    if let Some(span) = extract_balanced(text, '{', '}').or_else(|| extract_balanced(text, '[', ']')) {
        if !candidates.contains(&span) {
            candidates.push(span);
        }
    }

    for candidate in candidates {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some((value, ParseStrategy::Extracted));
        }
        if let Ok(value) = serde_json::from_str::<Value>(&sanitize_json_text(candidate)) {
            return Some((value, ParseStrategy::ExtractedCleaned));
        }
    }
    None
}
